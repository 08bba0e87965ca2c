use std::future::Future;

use crate::http::request::Request;
use crate::http::response::Response;

/// 传输层错误：请求没有得到任何 HTTP 响应
///
/// 非 2xx 状态码不属于此类，它们作为普通响应返回。
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP request failed: {0}")]
    Http(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

/// 发送单个 HTTP 请求
///
/// 只尝试一次，不重试。执行器通过此 trait 发送请求，测试中可替换为桩实现。
pub trait Dispatcher {
    fn dispatch(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send;
}
