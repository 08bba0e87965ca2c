use crate::expression::lexer::tokenize;
use crate::expression::types::{BinaryOp, EvaluationError, Expr, LogicalOp, Token, UnaryOp};
use crate::expression::value::number_value;
use serde_json::Value;

/// 解析表达式
///
/// 支持的语法（JavaScript 子集，无副作用）：
/// - 字面量：`200`、`'text'`、`"text"`、`true`、`false`、`null`、`undefined`、`[1, 2]`
/// - 变量与属性：`id`、`response.data.items[0].name`、`user?.profile`
/// - 内置方法：`name.startsWith('w')`、`tags.includes('x')`
/// - 运算符：`! - +`、`* / %`、`+ -`、`< <= > >=`、`== != === !==`、`&&`、`||`、`??`、`?:`
pub fn parse_expression(input: &str) -> Result<Expr, EvaluationError> {
    let syntax = |message: String| EvaluationError::Syntax {
        expr: input.trim().to_string(),
        message,
    };

    let tokens = tokenize(input).map_err(syntax)?;
    if tokens.is_empty() {
        return Err(syntax("empty expression".to_string()));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.conditional().map_err(syntax)?;

    if let Some((token, at)) = parser.tokens.get(parser.pos) {
        return Err(syntax(format!("unexpected token '{}' at {}", token, at)));
    }

    Ok(expr)
}

type ParseResult<T> = Result<T, String>;

/// 语法树的最大嵌套层数，括号、一元运算和运算符链都计入
const MAX_DEPTH: usize = 64;

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn next(&mut self) -> Option<(Token, usize)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn peek_punct(&self, punct: &str) -> bool {
        matches!(self.peek(), Some(Token::Punct(p)) if *p == punct)
    }

    fn eat(&mut self, punct: &str) -> bool {
        if self.peek_punct(punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: &str) -> ParseResult<()> {
        match self.next() {
            Some((Token::Punct(p), _)) if p == punct => Ok(()),
            Some((token, at)) => Err(format!(
                "expected '{}' but found '{}' at {}",
                punct, token, at
            )),
            None => Err(format!("expected '{}' but reached end of expression", punct)),
        }
    }

    fn identifier(&mut self) -> ParseResult<String> {
        match self.next() {
            Some((Token::Ident(name), _)) => Ok(name),
            Some((token, at)) => Err(format!(
                "expected property name but found '{}' at {}",
                token, at
            )),
            None => Err("expected property name but reached end of expression".to_string()),
        }
    }

    fn enter(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(format!("expression nested deeper than {} levels", MAX_DEPTH));
        }
        Ok(())
    }

    fn conditional(&mut self) -> ParseResult<Expr> {
        self.enter()?;
        let expr = self.ternary();
        self.depth -= 1;
        expr
    }

    fn ternary(&mut self) -> ParseResult<Expr> {
        let test = self.logical_or()?;
        if !self.eat("?") {
            return Ok(test);
        }
        let consequent = self.conditional()?;
        self.expect(":")?;
        let alternate = self.conditional()?;
        Ok(Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    fn logical_or(&mut self) -> ParseResult<Expr> {
        let mut left = self.logical_and()?;
        let mut levels = 0;
        loop {
            let op = if self.eat("||") {
                LogicalOp::Or
            } else if self.eat("??") {
                LogicalOp::Nullish
            } else {
                break;
            };
            self.enter()?;
            levels += 1;
            let right = self.logical_and()?;
            left = Expr::Logical {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        self.depth -= levels;
        Ok(left)
    }

    fn logical_and(&mut self) -> ParseResult<Expr> {
        let mut left = self.equality()?;
        let mut levels = 0;
        while self.eat("&&") {
            self.enter()?;
            levels += 1;
            let right = self.equality()?;
            left = Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        self.depth -= levels;
        Ok(left)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.binary_level(&["===", "!==", "==", "!="], Self::relational)
    }

    fn relational(&mut self) -> ParseResult<Expr> {
        self.binary_level(&["<=", ">=", "<", ">"], Self::additive)
    }

    fn additive(&mut self) -> ParseResult<Expr> {
        self.binary_level(&["+", "-"], Self::multiplicative)
    }

    fn multiplicative(&mut self) -> ParseResult<Expr> {
        self.binary_level(&["*", "/", "%"], Self::unary)
    }

    /// 左结合的二元运算层
    fn binary_level(
        &mut self,
        ops: &[&str],
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut left = operand(self)?;
        let mut levels = 0;
        loop {
            let Some(op) = ops
                .iter()
                .find(|op| self.peek_punct(op))
                .and_then(|op| BinaryOp::from_punct(op))
            else {
                break;
            };
            self.pos += 1;
            self.enter()?;
            levels += 1;
            let right = operand(self)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        self.depth -= levels;
        Ok(left)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        let op = if self.eat("!") {
            UnaryOp::Not
        } else if self.eat("-") {
            UnaryOp::Neg
        } else if self.eat("+") {
            UnaryOp::Plus
        } else {
            return self.postfix();
        };
        self.enter()?;
        let operand = self.unary();
        self.depth -= 1;
        let operand = operand?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;
        let mut levels = 0;
        loop {
            if self.peek_punct(".") || self.peek_punct("?.") || self.peek_punct("[") {
                self.enter()?;
                levels += 1;
            }
            if self.eat(".") {
                expr = self.member(expr, false)?;
            } else if self.eat("?.") {
                if self.eat("[") {
                    expr = self.index(expr, true)?;
                } else {
                    expr = self.member(expr, true)?;
                }
            } else if self.eat("[") {
                expr = self.index(expr, false)?;
            } else if self.peek_punct("(") {
                return Err("only built-in methods can be called".to_string());
            } else {
                break;
            }
        }
        self.depth -= levels;
        Ok(expr)
    }

    fn member(&mut self, object: Expr, optional: bool) -> ParseResult<Expr> {
        let property = self.identifier()?;
        if self.eat("(") {
            let args = self.arguments()?;
            return Ok(Expr::Call {
                object: Box::new(object),
                method: property,
                args,
            });
        }
        Ok(Expr::Member {
            object: Box::new(object),
            property,
            optional,
        })
    }

    fn index(&mut self, object: Expr, optional: bool) -> ParseResult<Expr> {
        let index = self.conditional()?;
        self.expect("]")?;
        Ok(Expr::Index {
            object: Box::new(object),
            index: Box::new(index),
            optional,
        })
    }

    /// 解析 `(` 之后的参数列表，包括结尾的 `)`
    fn arguments(&mut self) -> ParseResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.eat(")") {
            return Ok(args);
        }
        loop {
            args.push(self.conditional()?);
            if self.eat(")") {
                return Ok(args);
            }
            self.expect(",")?;
        }
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        match self.next() {
            Some((Token::Number(n), _)) => Ok(Expr::Literal(number_value(n))),
            Some((Token::Str(s), _)) => Ok(Expr::Literal(Value::String(s))),
            Some((Token::Ident(name), _)) => Ok(match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" => Expr::Literal(Value::Null),
                "undefined" => Expr::Undefined,
                _ => Expr::Ident(name),
            }),
            Some((Token::Punct("("), _)) => {
                let expr = self.conditional()?;
                self.expect(")")?;
                Ok(expr)
            }
            Some((Token::Punct("["), _)) => {
                let mut items = Vec::new();
                if self.eat("]") {
                    return Ok(Expr::Array(items));
                }
                loop {
                    items.push(self.conditional()?);
                    if self.eat("]") {
                        return Ok(Expr::Array(items));
                    }
                    self.expect(",")?;
                }
            }
            Some((Token::Punct("="), at)) => {
                Err(format!("assignment is not supported (at {})", at))
            }
            Some((token, at)) => Err(format!("unexpected token '{}' at {}", token, at)),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}
