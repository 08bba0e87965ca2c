use std::fmt;
use std::str::FromStr;

use crate::{Result, RuflowError};

/// 常用方法有独立的变体，其他合法的方法名（如 `TRACE`、`PROPFIND`）保存在 `Other` 中
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Other(reqwest::Method),
}

impl FromStr for Method {
    type Err = RuflowError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            "" => Err(RuflowError::ParseError("Empty HTTP method".to_string())),
            other => reqwest::Method::from_bytes(other.as_bytes())
                .map(Method::Other)
                .map_err(|_| RuflowError::ParseError(format!("Invalid HTTP method: {}", s))),
        }
    }
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Other(method) => method.as_str(),
        }
    }

    /// 转换为 reqwest 的方法类型
    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
            Method::Head => reqwest::Method::HEAD,
            Method::Options => reqwest::Method::OPTIONS,
            Method::Other(method) => method.clone(),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// URL 规范化
///
/// 支持几种简写:
/// - `:3000/api` -> `http://localhost:3000/api`
/// - `localhost:3000` -> `http://localhost:3000`
/// - `https://:8443` -> `https://localhost:8443`
pub struct UrlNormalizer;

impl UrlNormalizer {
    const DEFAULT_HOST: &'static str = "localhost";
    const DEFAULT_SCHEME: &'static str = "http";

    pub fn normalize(input: &str) -> Result<url::Url> {
        let input = input.trim();

        let normalized = if input.starts_with(':') {
            format!("{}://{}{}", Self::DEFAULT_SCHEME, Self::DEFAULT_HOST, input)
        } else if let Some(pos) = input.find("://") {
            let after_scheme = &input[pos + 3..];
            if after_scheme.starts_with(':') {
                format!("{}://{}{}", &input[..pos], Self::DEFAULT_HOST, after_scheme)
            } else {
                input.to_string()
            }
        } else {
            format!("{}://{}", Self::DEFAULT_SCHEME, input)
        };

        Ok(url::Url::parse(&normalized)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(u16);

impl Status {
    pub fn new(code: u16) -> Result<Self> {
        if (100..600).contains(&code) {
            Ok(Self(code))
        } else {
            Err(RuflowError::ParseError(format!(
                "Invalid HTTP status code: {}",
                code
            )))
        }
    }

    pub fn code(&self) -> u16 {
        self.0
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.0)
    }

    pub fn is_client_error(&self) -> bool {
        (400..=499).contains(&self.0)
    }

    /// 标准原因短语，未知状态码返回空字符串
    pub fn reason_phrase(&self) -> &'static str {
        reqwest::StatusCode::from_u16(self.0)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("")
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_case_insensitive() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!(" Post ".parse::<Method>().unwrap(), Method::Post);
        assert_eq!("PATCH".parse::<Method>().unwrap(), Method::Patch);
        assert_eq!("PATCH".parse::<Method>().unwrap().to_reqwest(), reqwest::Method::PATCH);
    }

    #[test]
    fn test_method_extension_verbs() {
        let trace: Method = "trace".parse().unwrap();
        assert_eq!(trace.as_str(), "TRACE");
        assert_eq!(trace.to_reqwest(), reqwest::Method::TRACE);

        let propfind: Method = "PROPFIND".parse().unwrap();
        assert_eq!(propfind.to_string(), "PROPFIND");
        assert_eq!(propfind.to_reqwest().as_str(), "PROPFIND");

        for invalid in ["", "  ", "BAD METHOD", "GET/1", "(get)"] {
            assert!(invalid.parse::<Method>().is_err(), "{:?} should be rejected", invalid);
        }
    }

    #[test]
    fn test_normalize_full_url() {
        let url = UrlNormalizer::normalize("https://api.example.com:8443/v1/users?id=1").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("api.example.com"));
        assert_eq!(url.port(), Some(8443));
        assert_eq!(url.path(), "/v1/users");
        assert_eq!(url.query(), Some("id=1"));
    }

    #[test]
    fn test_normalize_without_scheme() {
        let url = UrlNormalizer::normalize("example.com/api/users").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.path(), "/api/users");
    }

    #[test]
    fn test_normalize_port_only() {
        let url = UrlNormalizer::normalize(":8080/path").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/path");
    }

    #[test]
    fn test_normalize_scheme_with_port() {
        let url = UrlNormalizer::normalize("https://:8443").unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.port(), Some(8443));
    }

    #[test]
    fn test_normalize_localhost_with_port() {
        let url = UrlNormalizer::normalize("  localhost:3000/api/v1 ").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/v1");
    }

    #[test]
    fn test_normalize_invalid() {
        assert!(UrlNormalizer::normalize("http://").is_err());
    }

    #[test]
    fn test_status() {
        let status = Status::new(404).unwrap();
        assert!(status.is_client_error());
        assert!(!status.is_success());
        assert_eq!(status.reason_phrase(), "Not Found");
        assert!(Status::new(99).is_err());
        assert!(Status::new(600).is_err());
    }
}
