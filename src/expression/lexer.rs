use crate::expression::types::Token;

/// 多字符运算符放在前面，保证最长匹配
const PUNCTUATORS: [&str; 29] = [
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "??", "?.", "<", ">", "!", "+", "-", "*",
    "/", "%", "(", ")", "[", "]", ".", ",", "?", ":", "{", "}", "=",
];

/// 将表达式切分为词法单元，附带每个单元的起始位置
pub fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, String> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && next_is_digit(&chars, i)) {
            let start = i;
            while i < chars.len() && (chars[i].1.is_ascii_digit() || chars[i].1 == '.') {
                i += 1;
            }
            // 科学计数法
            if i < chars.len() && matches!(chars[i].1, 'e' | 'E') {
                i += 1;
                if i < chars.len() && matches!(chars[i].1, '+' | '-') {
                    i += 1;
                }
                while i < chars.len() && chars[i].1.is_ascii_digit() {
                    i += 1;
                }
            }
            let text: String = chars[start..i].iter().map(|(_, c)| c).collect();
            let number = text
                .parse::<f64>()
                .map_err(|_| format!("invalid number '{}' at {}", text, pos))?;
            tokens.push((Token::Number(number), pos));
            continue;
        }

        if c == '"' || c == '\'' {
            let (text, next) = read_string(&chars, i, c)?;
            tokens.push((Token::Str(text), pos));
            i = next;
            continue;
        }

        if c.is_alphabetic() || c == '_' || c == '$' {
            let start = i;
            while i < chars.len()
                && (chars[i].1.is_alphanumeric() || chars[i].1 == '_' || chars[i].1 == '$')
            {
                i += 1;
            }
            let name: String = chars[start..i].iter().map(|(_, c)| c).collect();
            tokens.push((Token::Ident(name), pos));
            continue;
        }

        let rest = &input[pos..];
        let punct: &'static str = PUNCTUATORS
            .iter()
            .copied()
            .find(|p| rest.starts_with(*p))
            .ok_or_else(|| format!("unexpected character '{}' at {}", c, pos))?;

        // `a?.5:1` 中的 `?.` 是三元运算符加小数
        if punct == "?." && next_is_digit(&chars, i + 1) {
            tokens.push((Token::Punct("?"), pos));
            i += 1;
            continue;
        }

        tokens.push((Token::Punct(punct), pos));
        i += punct.chars().count();
    }

    Ok(tokens)
}

fn next_is_digit(chars: &[(usize, char)], i: usize) -> bool {
    chars.get(i + 1).is_some_and(|(_, c)| c.is_ascii_digit())
}

fn read_string(
    chars: &[(usize, char)],
    start: usize,
    quote: char,
) -> Result<(String, usize), String> {
    let mut text = String::new();
    let mut i = start + 1;

    while i < chars.len() {
        let c = chars[i].1;
        if c == quote {
            return Ok((text, i + 1));
        }
        if c == '\\' {
            i += 1;
            let escaped = chars
                .get(i)
                .map(|(_, c)| *c)
                .ok_or_else(|| "unterminated escape sequence".to_string())?;
            text.push(match escaped {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                '0' => '\0',
                other => other,
            });
        } else {
            text.push(c);
        }
        i += 1;
    }

    Err(format!("unterminated string starting at {}", chars[start].0))
}
