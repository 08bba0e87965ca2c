use thiserror::Error;

use crate::document::DocumentError;
use crate::expression::EvaluationError;
use crate::http::TransportError;
use crate::variable::TemplateError;

#[derive(Error, Debug)]
pub enum RuflowError {
    #[error("解析错误: {0}")]
    ParseError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("文档加载失败: {0}")]
    Document(#[from] DocumentError),

    #[error("模板错误: {0}")]
    Template(#[from] TemplateError),

    #[error("表达式错误: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("网络错误: {0}")]
    Transport(#[from] TransportError),

    #[error("URL 解析错误: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for RuflowError {
    fn from(err: anyhow::Error) -> Self {
        RuflowError::Other(err.to_string())
    }
}

/// Result type for ruflow crate
pub type Result<T> = std::result::Result<T, RuflowError>;
