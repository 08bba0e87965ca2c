use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::http::dispatcher::TransportError;
use crate::http::types::{Method, UrlNormalizer};

/// 已完成模板解析、可直接发送的请求
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: url::Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl Request {
    pub fn new(method: &str, url: &str) -> Result<Self, TransportError> {
        let method = method
            .parse()
            .map_err(|e| TransportError::InvalidRequest(format!("{}", e)))?;
        let url = UrlNormalizer::normalize(url)
            .map_err(|e| TransportError::InvalidRequest(format!("invalid URL '{}': {}", url, e)))?;

        Ok(Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        })
    }

    /// 设置 header，同名（大小写不敏感）时覆盖
    pub fn with_header(mut self, key: &str, value: &str) -> Result<Self, TransportError> {
        let name: HeaderName = key
            .parse()
            .map_err(|_| TransportError::InvalidRequest(format!("invalid header name '{}'", key)))?;
        let value: HeaderValue = value.parse().map_err(|_| {
            TransportError::InvalidRequest(format!("invalid value for header '{}'", key))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_request() {
        let request = Request::new("post", "https://api.test/items").unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url.as_str(), "https://api.test/items");
        assert!(request.headers.is_empty());
        assert!(request.body.is_none());
    }

    #[test]
    fn test_invalid_method() {
        let err = Request::new("GET /x", "https://api.test").unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }

    #[test]
    fn test_invalid_url() {
        assert!(Request::new("GET", "http://").is_err());
    }

    #[test]
    fn test_header_override_is_case_insensitive() {
        let request = Request::new("GET", "https://api.test")
            .unwrap()
            .with_header("Content-Type", "application/json")
            .unwrap()
            .with_header("content-type", "text/plain")
            .unwrap();

        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.header("CONTENT-TYPE"), Some("text/plain"));
    }

    #[test]
    fn test_invalid_header_name() {
        let result = Request::new("GET", "https://api.test")
            .unwrap()
            .with_header("bad header", "x");
        assert!(result.is_err());
    }
}
