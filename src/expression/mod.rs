/// 表达式模块 - 捕获与断言使用的受限表达式语言
mod evaluator;
mod lexer;
mod parser;
mod types;
mod value;

pub use evaluator::{EvalContext, evaluate, evaluate_assertion, evaluate_capture};
pub use parser::parse_expression;
pub use types::{BinaryOp, EvaluationError, Evaluated, Expr, LogicalOp, UnaryOp};
pub use value::{format_json_number, is_truthy};
