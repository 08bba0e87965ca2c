//! JavaScript 风格的值语义：真值判断、类型转换与相等比较

use crate::expression::types::Evaluated;
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// 安全整数上限（2^53）
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// f64 转 JSON 数字，整数保持整数形式；NaN 与无穷大变为 null
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// 数字类型的值（运算结果或 JSON 数字）
pub fn as_number(value: &Evaluated) -> Option<f64> {
    match value {
        Evaluated::Number(n) => Some(*n),
        Evaluated::Value(Value::Number(n)) => n.as_f64(),
        _ => None,
    }
}

pub fn is_truthy(value: &Evaluated) -> bool {
    match value {
        Evaluated::Undefined => false,
        Evaluated::Number(n) => *n != 0.0 && !n.is_nan(),
        Evaluated::Value(v) => match v {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        },
    }
}

pub fn to_number(value: &Evaluated) -> f64 {
    match value {
        Evaluated::Undefined => f64::NAN,
        Evaluated::Number(n) => *n,
        Evaluated::Value(v) => match v {
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Value::String(s) => parse_number(s),
            Value::Array(_) | Value::Object(_) => f64::NAN,
        },
    }
}

/// 字符串转数字，规则同 JavaScript 的 `Number(text)`
///
/// 空白字符串为 0；接受十进制、`0x`/`0o`/`0b` 前缀整数和 `Infinity`，其余（包括 `inf`、`NaN`）为 NaN。
fn parse_number(text: &str) -> f64 {
    let s = text.trim();
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return f64::NAN;
            }
            return u128::from_str_radix(digits, radix)
                .map(|n| n as f64)
                .unwrap_or(f64::INFINITY);
        }
    }

    let decimal = s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if decimal && s.chars().any(|c| c.is_ascii_digit()) {
        s.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // 指数形式，正指数带 `+`：1e+21、1.5e-7
        let text = format!("{:e}", n);
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => text,
        }
    } else if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

/// JSON 数字的文本形式：整数原样输出，浮点数按 JavaScript 规则（`10.0` 输出 `10`）
pub fn format_json_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => format_number(f),
        _ => n.to_string(),
    }
}

/// 字符串转换，用于 `+` 拼接
pub fn to_js_string(value: &Evaluated) -> String {
    match value {
        Evaluated::Undefined => "undefined".to_string(),
        Evaluated::Number(n) => format_number(*n),
        Evaluated::Value(v) => json_to_string(v),
    }
}

fn json_to_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_json_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => json_to_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// 类型名，用于错误消息
pub fn type_name(value: &Evaluated) -> &'static str {
    match value {
        Evaluated::Undefined => "undefined",
        Evaluated::Number(_) => "number",
        Evaluated::Value(v) => match v {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        },
    }
}

fn is_object_like(value: &Evaluated) -> bool {
    matches!(value, Evaluated::Value(Value::Array(_) | Value::Object(_)))
}

/// `===`：类型和值都相同；`NaN` 不等于自身；数组与对象按结构比较
pub fn strict_equals(left: &Evaluated, right: &Evaluated) -> bool {
    if let (Some(a), Some(b)) = (as_number(left), as_number(right)) {
        return a == b;
    }

    match (left, right) {
        (Evaluated::Undefined, Evaluated::Undefined) => true,
        (Evaluated::Value(a), Evaluated::Value(b)) => a == b,
        _ => false,
    }
}

/// `==`：标量之间按 JavaScript 规则做类型转换，`null == undefined`
pub fn loose_equals(left: &Evaluated, right: &Evaluated) -> bool {
    if left.is_nullish() || right.is_nullish() {
        return left.is_nullish() && right.is_nullish();
    }

    match (left, right) {
        (Evaluated::Value(Value::String(x)), Evaluated::Value(Value::String(y))) => x == y,
        (Evaluated::Value(a), Evaluated::Value(b))
            if is_object_like(left) && is_object_like(right) =>
        {
            a == b
        }
        _ if is_object_like(left) || is_object_like(right) => {
            to_js_string(left) == to_js_string(right)
        }
        _ => to_number(left) == to_number(right),
    }
}

/// 关系比较：两个字符串按 UTF-16 码元比较，否则按数字比较（NaN 不可比较）
pub fn compare(left: &Evaluated, right: &Evaluated) -> Option<Ordering> {
    match (left, right) {
        (Evaluated::Value(Value::String(a)), Evaluated::Value(Value::String(b))) => {
            Some(a.encode_utf16().cmp(b.encode_utf16()))
        }
        _ => to_number(left).partial_cmp(&to_number(right)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(value: Value) -> Evaluated {
        Evaluated::Value(value)
    }

    #[test]
    fn test_truthiness() {
        for falsy in [json!(false), json!(0), json!(""), Value::Null, json!(0.0)] {
            assert!(!is_truthy(&v(falsy)));
        }
        assert!(!is_truthy(&Evaluated::Undefined));
        assert!(!is_truthy(&Evaluated::Number(f64::NAN)));
        assert!(!is_truthy(&Evaluated::Number(-0.0)));

        for truthy in [json!(true), json!(1), json!("0"), json!([]), json!({}), json!(-1.5)] {
            assert!(is_truthy(&v(truthy)));
        }
        assert!(is_truthy(&Evaluated::Number(f64::INFINITY)));
    }

    #[test]
    fn test_number_value() {
        assert_eq!(number_value(3.0), json!(3));
        assert_eq!(number_value(-2.0), json!(-2));
        assert_eq!(number_value(0.25), json!(0.25));
        assert_eq!(number_value(f64::NAN), Value::Null);
        assert_eq!(number_value(f64::INFINITY), Value::Null);
    }

    #[test]
    fn test_to_number() {
        assert_eq!(to_number(&v(json!("42"))), 42.0);
        assert_eq!(to_number(&v(json!(" 1.5 "))), 1.5);
        assert_eq!(to_number(&v(json!(""))), 0.0);
        assert_eq!(to_number(&v(json!(".5"))), 0.5);
        assert_eq!(to_number(&v(json!("-1e3"))), -1000.0);
        assert_eq!(to_number(&v(json!("0x1F"))), 31.0);
        assert_eq!(to_number(&v(json!("0b101"))), 5.0);
        assert_eq!(to_number(&v(json!("Infinity"))), f64::INFINITY);
        assert_eq!(to_number(&v(json!("-Infinity"))), f64::NEG_INFINITY);
        assert_eq!(to_number(&v(json!(true))), 1.0);
        assert_eq!(to_number(&v(Value::Null)), 0.0);
        assert!(to_number(&Evaluated::Undefined).is_nan());
        for text in ["abc", "inf", "infinity", "INF", "NaN", "nan", "0x", "0xZZ", "1_000"] {
            assert!(to_number(&v(json!(text))).is_nan(), "{} should be NaN", text);
        }
    }

    #[test]
    fn test_to_js_string() {
        assert_eq!(to_js_string(&v(json!(2))), "2");
        assert_eq!(to_js_string(&v(json!(2.5))), "2.5");
        assert_eq!(to_js_string(&v(json!(10.0))), "10");
        assert_eq!(to_js_string(&v(json!([1, null, "a"]))), "1,,a");
        assert_eq!(to_js_string(&v(json!({"a": 1}))), "[object Object]");
        assert_eq!(to_js_string(&Evaluated::Undefined), "undefined");
        assert_eq!(to_js_string(&Evaluated::Number(f64::NAN)), "NaN");
        assert_eq!(to_js_string(&Evaluated::Number(f64::NEG_INFINITY)), "-Infinity");
        assert_eq!(to_js_string(&Evaluated::Number(-0.0)), "0");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e30), "-2.5e+30");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(0.000001), "0.000001");
    }

    #[test]
    fn test_format_json_number() {
        assert_eq!(format_json_number(&Number::from(42)), "42");
        assert_eq!(format_json_number(&Number::from(u64::MAX)), "18446744073709551615");
        assert_eq!(format_json_number(&Number::from_f64(10.0).unwrap()), "10");
        assert_eq!(format_json_number(&Number::from_f64(0.1).unwrap()), "0.1");
    }

    #[test]
    fn test_strict_equals() {
        assert!(strict_equals(&v(json!(200)), &v(json!(200.0))));
        assert!(strict_equals(&v(json!(3)), &Evaluated::Number(3.0)));
        assert!(!strict_equals(&v(json!(200)), &v(json!("200"))));
        assert!(!strict_equals(&v(Value::Null), &Evaluated::Undefined));
        assert!(strict_equals(&Evaluated::Undefined, &Evaluated::Undefined));
        assert!(strict_equals(&v(json!({"a": [1]})), &v(json!({"a": [1]}))));
        assert!(!strict_equals(
            &Evaluated::Number(f64::NAN),
            &Evaluated::Number(f64::NAN)
        ));
        assert!(!strict_equals(&Evaluated::Number(f64::NAN), &v(Value::Null)));
    }

    #[test]
    fn test_loose_equals() {
        assert!(loose_equals(&v(json!(200)), &v(json!("200"))));
        assert!(loose_equals(&v(json!(1)), &v(json!(true))));
        assert!(loose_equals(&v(Value::Null), &Evaluated::Undefined));
        assert!(!loose_equals(&v(Value::Null), &v(json!(0))));
        assert!(!loose_equals(&v(json!("a")), &v(json!("b"))));
        assert!(loose_equals(&v(json!([1, 2])), &v(json!("1,2"))));
        assert!(loose_equals(&Evaluated::Number(5.0), &v(json!("5"))));
        assert!(!loose_equals(&Evaluated::Number(f64::NAN), &v(json!("NaN"))));
    }

    #[test]
    fn test_compare() {
        assert_eq!(compare(&v(json!("abc")), &v(json!("abd"))), Some(Ordering::Less));
        assert_eq!(compare(&v(json!(10)), &v(json!("9"))), Some(Ordering::Greater));
        assert_eq!(compare(&Evaluated::Number(f64::NAN), &v(json!(1))), None);
        // U+FF61 的 UTF-16 码元大于代理对 U+1F600 的首个码元 0xD83D
        assert_eq!(
            compare(&v(json!("\u{FF61}")), &v(json!("\u{1F600}"))),
            Some(Ordering::Greater)
        );
    }
}
