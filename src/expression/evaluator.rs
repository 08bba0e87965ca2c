use crate::expression::parser::parse_expression;
use crate::expression::types::{BinaryOp, EvaluationError, Evaluated, Expr, LogicalOp, UnaryOp};
use crate::expression::value::{
    compare, is_truthy, loose_equals, strict_equals, to_js_string, to_number, type_name,
};
use crate::variable::{RESPONSE_KEY, VariableEnvironment};
use serde_json::Value;
use std::cmp::Ordering;

/// 求值上下文
///
/// 变量环境中的所有条目都可以直接按名称引用。捕获模式下额外绑定刚收到的响应为 `response`。
///
/// 表达式由文档作者编写，作者是可信的。表达式语言本身没有副作用，也无法访问网络或文件。
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    env: &'a VariableEnvironment,
    response: Option<&'a Value>,
}

impl<'a> EvalContext<'a> {
    /// 断言模式
    pub fn assertion(env: &'a VariableEnvironment) -> Self {
        Self {
            env,
            response: None,
        }
    }

    /// 捕获模式
    pub fn capture(env: &'a VariableEnvironment, response: Option<&'a Value>) -> Self {
        Self { env, response }
    }

    fn lookup(&self, name: &str) -> Option<&'a Value> {
        if name == RESPONSE_KEY {
            if let Some(response) = self.response {
                return Some(response);
            }
        }
        self.env.get(name)
    }
}

/// 解析并求值表达式
pub fn evaluate(source: &str, ctx: &EvalContext<'_>) -> Result<Evaluated, EvaluationError> {
    let expr = parse_expression(source)?;
    eval(&expr, ctx).map_err(|message| EvaluationError::Runtime {
        expr: source.trim().to_string(),
        message,
    })
}

/// 捕获：求值结果写入变量，`undefined` 存为 `null`
pub fn evaluate_capture(
    source: &str,
    env: &VariableEnvironment,
    response: Option<&Value>,
) -> Result<Value, EvaluationError> {
    let ctx = EvalContext::capture(env, response);
    evaluate(source, &ctx).map(Evaluated::into_json)
}

/// 断言：求值结果按真值规则转为布尔
pub fn evaluate_assertion(
    source: &str,
    env: &VariableEnvironment,
) -> Result<bool, EvaluationError> {
    let ctx = EvalContext::assertion(env);
    evaluate(source, &ctx).map(|value| is_truthy(&value))
}

fn eval(expr: &Expr, ctx: &EvalContext<'_>) -> Result<Evaluated, String> {
    match expr {
        Expr::Literal(value) => Ok(Evaluated::Value(value.clone())),
        Expr::Undefined => Ok(Evaluated::Undefined),
        Expr::Array(items) => {
            let values = items
                .iter()
                .map(|item| eval(item, ctx).map(Evaluated::into_json))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Evaluated::Value(Value::Array(values)))
        }
        Expr::Ident(name) => ctx
            .lookup(name)
            .cloned()
            .map(Evaluated::Value)
            .ok_or_else(|| format!("{} is not defined", name)),
        Expr::Member {
            object,
            property,
            optional,
        } => {
            let object = eval(object, ctx)?;
            get_property(&object, property, *optional)
        }
        Expr::Index {
            object,
            index,
            optional,
        } => {
            let object = eval(object, ctx)?;
            let key = to_js_string(&eval(index, ctx)?);
            get_property(&object, &key, *optional)
        }
        Expr::Call {
            object,
            method,
            args,
        } => {
            let object = eval(object, ctx)?;
            let args = args
                .iter()
                .map(|arg| eval(arg, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            call_method(&object, method, &args)
        }
        Expr::Unary { op, operand } => {
            let value = eval(operand, ctx)?;
            Ok(match op {
                UnaryOp::Not => Evaluated::Value(Value::Bool(!is_truthy(&value))),
                UnaryOp::Neg => Evaluated::Number(-to_number(&value)),
                UnaryOp::Plus => Evaluated::Number(to_number(&value)),
            })
        }
        Expr::Binary { op, left, right } => {
            let left = eval(left, ctx)?;
            let right = eval(right, ctx)?;
            Ok(binary(*op, &left, &right))
        }
        Expr::Logical { op, left, right } => {
            let left = eval(left, ctx)?;
            let take_left = match op {
                LogicalOp::And => !is_truthy(&left),
                LogicalOp::Or => is_truthy(&left),
                LogicalOp::Nullish => !left.is_nullish(),
            };
            if take_left { Ok(left) } else { eval(right, ctx) }
        }
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            if is_truthy(&eval(test, ctx)?) {
                eval(consequent, ctx)
            } else {
                eval(alternate, ctx)
            }
        }
    }
}

fn get_property(object: &Evaluated, property: &str, optional: bool) -> Result<Evaluated, String> {
    let value = match object {
        Evaluated::Value(value) => value,
        Evaluated::Number(_) => return Ok(Evaluated::Undefined),
        Evaluated::Undefined => return nullish_access(object, property, optional),
    };

    let found = match value {
        Value::Null => return nullish_access(object, property, optional),
        Value::Object(map) => map.get(property).cloned(),
        Value::Array(items) if property == "length" => Some(Value::from(items.len())),
        Value::Array(items) => property
            .parse::<usize>()
            .ok()
            .and_then(|i| items.get(i).cloned()),
        Value::String(s) if property == "length" => Some(Value::from(s.chars().count())),
        Value::String(s) => property
            .parse::<usize>()
            .ok()
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::String(c.to_string())),
        Value::Bool(_) | Value::Number(_) => None,
    };

    Ok(found.map_or(Evaluated::Undefined, Evaluated::Value))
}

fn nullish_access(object: &Evaluated, property: &str, optional: bool) -> Result<Evaluated, String> {
    if optional {
        Ok(Evaluated::Undefined)
    } else {
        Err(format!(
            "cannot read property '{}' of {}",
            property,
            type_name(object)
        ))
    }
}

fn call_method(object: &Evaluated, method: &str, args: &[Evaluated]) -> Result<Evaluated, String> {
    let arg = |i: usize| args.get(i).cloned().unwrap_or(Evaluated::Undefined);
    let arg_string = |i: usize| to_js_string(&arg(i));

    let result = match object {
        Evaluated::Value(Value::String(s)) => match method {
            "includes" => Value::Bool(s.contains(&arg_string(0))),
            "startsWith" => Value::Bool(s.starts_with(&arg_string(0))),
            "endsWith" => Value::Bool(s.ends_with(&arg_string(0))),
            "toLowerCase" => Value::String(s.to_lowercase()),
            "toUpperCase" => Value::String(s.to_uppercase()),
            "trim" => Value::String(s.trim().to_string()),
            "indexOf" => {
                let position = s
                    .find(&arg_string(0))
                    .map(|byte| s[..byte].chars().count() as i64)
                    .unwrap_or(-1);
                Value::from(position)
            }
            _ => return Err(format!("{} is not a function on string", method)),
        },
        Evaluated::Value(Value::Array(items)) => {
            let needle = arg(0);
            let position = || {
                items
                    .iter()
                    .position(|item| strict_equals(&Evaluated::Value(item.clone()), &needle))
            };
            match method {
                "includes" => Value::Bool(position().is_some()),
                "indexOf" => Value::from(position().map(|i| i as i64).unwrap_or(-1)),
                "join" => {
                    let separator = match arg(0) {
                        Evaluated::Undefined => ",".to_string(),
                        other => to_js_string(&other),
                    };
                    let parts: Vec<_> = items
                        .iter()
                        .map(|item| match item {
                            Value::Null => String::new(),
                            other => to_js_string(&Evaluated::Value(other.clone())),
                        })
                        .collect();
                    Value::String(parts.join(&separator))
                }
                _ => return Err(format!("{} is not a function on array", method)),
            }
        }
        other => {
            return Err(format!(
                "{} is not a function on {}",
                method,
                type_name(other)
            ));
        }
    };

    Ok(Evaluated::Value(result))
}

fn binary(op: BinaryOp, left: &Evaluated, right: &Evaluated) -> Evaluated {
    let (a, b) = (to_number(left), to_number(right));
    let result = match op {
        BinaryOp::Add if is_string_like(left) || is_string_like(right) => {
            Value::String(to_js_string(left) + &to_js_string(right))
        }
        BinaryOp::Add => return Evaluated::Number(a + b),
        BinaryOp::Sub => return Evaluated::Number(a - b),
        BinaryOp::Mul => return Evaluated::Number(a * b),
        BinaryOp::Div => return Evaluated::Number(a / b),
        BinaryOp::Rem => return Evaluated::Number(a % b),
        BinaryOp::Less => Value::Bool(compare(left, right) == Some(Ordering::Less)),
        BinaryOp::LessOrEqual => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Greater => Value::Bool(compare(left, right) == Some(Ordering::Greater)),
        BinaryOp::GreaterOrEqual => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::LooseEqual => Value::Bool(loose_equals(left, right)),
        BinaryOp::LooseNotEqual => Value::Bool(!loose_equals(left, right)),
        BinaryOp::StrictEqual => Value::Bool(strict_equals(left, right)),
        BinaryOp::StrictNotEqual => Value::Bool(!strict_equals(left, right)),
    };
    Evaluated::Value(result)
}

/// 数组和对象在 `+` 中按字符串处理
fn is_string_like(value: &Evaluated) -> bool {
    matches!(
        value,
        Evaluated::Value(Value::String(_) | Value::Array(_) | Value::Object(_))
    )
}
