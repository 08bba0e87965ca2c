use crate::expression::value::number_value;
use serde_json::Value;
use std::fmt;

/// 表达式错误
///
/// `Syntax` 表示表达式本身写错，`Runtime` 表示求值过程中出错（引用未定义变量、
/// 访问 null 的属性等）。二者都与"断言结果为假"不同。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("syntax error in `{expr}`: {message}")]
    Syntax { expr: String, message: String },

    #[error("error evaluating `{expr}`: {message}")]
    Runtime { expr: String, message: String },
}

impl EvaluationError {
    pub fn expr(&self) -> &str {
        match self {
            EvaluationError::Syntax { expr, .. } | EvaluationError::Runtime { expr, .. } => expr,
        }
    }
}

/// 词法单元
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Punct(&'static str),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Str(s) => write!(f, "{:?}", s),
            Token::Ident(name) => write!(f, "{}", name),
            Token::Punct(p) => write!(f, "{}", p),
        }
    }
}

/// 抽象语法树
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Undefined,
    Array(Vec<Expr>),
    Ident(String),
    /// `a.b` / `a?.b`
    Member {
        object: Box<Expr>,
        property: String,
        optional: bool,
    },
    /// `a[expr]` / `a?.[expr]`
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        optional: bool,
    },
    /// `a.method(args)`，只允许内置方法
    Call {
        object: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `&&`、`||`、`??`，短路求值
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    LooseEqual,
    LooseNotEqual,
    StrictEqual,
    StrictNotEqual,
}

impl BinaryOp {
    pub fn from_punct(p: &str) -> Option<Self> {
        match p {
            "+" => Some(Self::Add),
            "-" => Some(Self::Sub),
            "*" => Some(Self::Mul),
            "/" => Some(Self::Div),
            "%" => Some(Self::Rem),
            "<" => Some(Self::Less),
            "<=" => Some(Self::LessOrEqual),
            ">" => Some(Self::Greater),
            ">=" => Some(Self::GreaterOrEqual),
            "==" => Some(Self::LooseEqual),
            "!=" => Some(Self::LooseNotEqual),
            "===" => Some(Self::StrictEqual),
            "!==" => Some(Self::StrictNotEqual),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Nullish,
}

/// 求值结果
///
/// 在 JSON 值之外区分出 `undefined`：访问不存在的属性得到 `Undefined`。
/// 运算产生的数字保持为 `Number(f64)`，因此 `NaN` 与 `Infinity` 在表达式内部可以参与比较。
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluated {
    Undefined,
    Number(f64),
    Value(Value),
}

impl Evaluated {
    /// 转为 JSON 值，`undefined` 变为 `null`，`NaN` 与无穷大也变为 `null`
    pub fn into_json(self) -> Value {
        match self {
            Evaluated::Undefined => Value::Null,
            Evaluated::Number(n) => number_value(n),
            Evaluated::Value(value) => value,
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Evaluated::Undefined | Evaluated::Value(Value::Null))
    }
}

impl From<Value> for Evaluated {
    fn from(value: Value) -> Self {
        Evaluated::Value(value)
    }
}
