use std::time::{Duration, Instant};

use crate::http::dispatcher::{Dispatcher, TransportError};
use crate::http::request::Request;
use crate::http::response::Response;

/// 基于 reqwest 的 HTTP 客户端
#[derive(Clone, Default)]
pub struct Client {
    inner: reqwest::Client,
}

impl Client {
    /// 使用 reqwest 默认设置（无超时）
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            inner: builder.build()?,
        })
    }

    pub async fn execute(&self, request: Request) -> Result<Response, TransportError> {
        let mut req = self
            .inner
            .request(request.method.to_reqwest(), request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            req = req.body(body);
        }

        let start = Instant::now();
        let response = req.send().await?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;
        let duration = start.elapsed();

        tracing::debug!(status, elapsed_ms = duration.as_millis() as u64, "response received");

        Response::new(status, headers, body, duration)
            .map_err(|e| TransportError::Http(e.to_string()))
    }
}

impl Dispatcher for Client {
    async fn dispatch(&self, request: Request) -> Result<Response, TransportError> {
        self.execute(request).await
    }
}
