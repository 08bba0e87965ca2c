use crate::Result;
use crate::http::types::Status;
use reqwest::header::HeaderMap;
use serde_json::{Map, Value, json};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Response {
    pub status: Status,
    pub headers: HeaderMap,
    pub body: String,
    pub duration: Duration,
}

impl Response {
    pub fn new(
        status: u16,
        headers: HeaderMap,
        body: impl Into<String>,
        duration: Duration,
    ) -> Result<Self> {
        Ok(Self {
            status: Status::new(status)?,
            headers,
            body: body.into(),
            duration,
        })
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.duration.as_millis() as u64
    }

    /// 反序列化后的 body：合法 JSON 返回解析结果，否则返回原始文本
    pub fn data(&self) -> Value {
        if self.body.trim().is_empty() {
            return Value::String(self.body.clone());
        }
        serde_json::from_str(&self.body).unwrap_or_else(|_| Value::String(self.body.clone()))
    }

    /// 转换为变量环境中 `response` 的值
    ///
    /// 形如 `{ status, statusText, headers, data, elapsedMs }`，header 名称统一小写。
    pub fn to_value(&self) -> Value {
        let mut headers = Map::new();
        for (name, value) in self.headers.iter() {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            // 重复 header 以逗号合并
            match headers.get_mut(name.as_str()) {
                Some(Value::String(existing)) => {
                    existing.push_str(", ");
                    existing.push_str(&value);
                }
                _ => {
                    headers.insert(name.as_str().to_string(), Value::String(value));
                }
            }
        }

        json!({
            "status": self.status.code(),
            "statusText": self.status.reason_phrase(),
            "headers": headers,
            "data": self.data(),
            "elapsedMs": self.elapsed_ms(),
        })
    }
}
