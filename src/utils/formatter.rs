use crate::http::Response;
use colored::*;
use serde_json::Value;

/// 紧凑模式下完整显示的响应体长度上限
const COMPACT_BODY_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Compact,
    Verbose,
}

#[derive(Debug, Clone)]
pub struct ResponseFormatter {
    format: ResponseFormat,
    color: bool,
}

impl ResponseFormatter {
    pub fn new(format: ResponseFormat) -> Self {
        Self {
            format,
            color: true,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn format(&self, response: &Response) -> String {
        let mut output = vec![self.status_line(response), self.timing_line(response)];

        if self.format == ResponseFormat::Verbose {
            output.push(String::new());
            output.push(self.paint_heading("Headers:"));
            for (key, value) in response.headers.iter() {
                let line = format!("   {}: {}", key, value.to_str().unwrap_or("<invalid utf-8>"));
                output.push(if self.color { line.blue().to_string() } else { line });
            }
        }

        let body = &response.body;
        if body.is_empty() {
            return output.join("\n");
        }

        match self.format {
            ResponseFormat::Compact if body.len() >= COMPACT_BODY_LIMIT => {
                output.push(format!("Body: {} bytes", body.len()));
            }
            ResponseFormat::Compact => output.push(self.format_body(body)),
            ResponseFormat::Verbose => {
                output.push(String::new());
                output.push(self.paint_heading("Body:"));
                output.push(self.format_body(body));
            }
        }

        output.join("\n")
    }

    /// JSON 响应体美化输出，其他内容原样返回
    pub fn format_body(&self, body: &str) -> String {
        self.try_format_json(body).unwrap_or_else(|_| body.to_string())
    }

    /// 捕获值的单行显示：字符串不带引号，其余为紧凑 JSON
    pub fn format_value(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn status_line(&self, response: &Response) -> String {
        let status_line = format!(
            "HTTP {} {}",
            response.status.code(),
            response.status.reason_phrase()
        );
        if !self.color {
            return status_line;
        }

        let colored = if response.is_success() {
            status_line.green()
        } else if response.status.is_client_error() {
            status_line.yellow()
        } else {
            status_line.red()
        };
        match self.format {
            ResponseFormat::Compact => colored.to_string(),
            ResponseFormat::Verbose => colored.bold().to_string(),
        }
    }

    fn timing_line(&self, response: &Response) -> String {
        let timing = format!("Time: {}ms", response.elapsed_ms());
        if self.color {
            timing.cyan().to_string()
        } else {
            timing
        }
    }

    fn paint_heading(&self, heading: &str) -> String {
        if self.color {
            heading.blue().bold().to_string()
        } else {
            heading.to_string()
        }
    }

    /// 尝试将 body 格式化为漂亮的 JSON
    /// 如果不是有效的 JSON，返回错误
    fn try_format_json(&self, body: &str) -> serde_json::Result<String> {
        let value: Value = serde_json::from_str(body)?;
        serde_json::to_string_pretty(&value)
    }
}
