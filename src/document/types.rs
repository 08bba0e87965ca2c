use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// 一次运行的输入文档
///
/// 加载完成后不再修改，变量环境从 `variables` 复制而来。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunDocument {
    /// 初始变量
    #[serde(default, deserialize_with = "null_as_default")]
    pub variables: IndexMap<String, Value>,

    /// 按顺序执行的动作列表
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions: Vec<Action>,
}

impl RunDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}

/// 单个动作：一个模板化的 HTTP 请求，加上捕获与断言规则
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// 名称，仅用于报告
    #[serde(default)]
    pub name: String,

    /// HTTP 方法，缺省为 GET
    #[serde(default = "default_method")]
    pub method: String,

    /// URL 模板
    pub url: String,

    /// 请求体模板
    #[serde(default)]
    pub body: Option<String>,

    /// Header 模板，值会被解析
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: IndexMap<String, String>,

    /// 变量名 -> 表达式，按声明顺序执行
    #[serde(default, deserialize_with = "null_as_default")]
    pub capture: IndexMap<String, String>,

    /// 断言表达式，按顺序执行
    #[serde(
        default,
        rename = "assert",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub assertions: Vec<String>,
}

impl Action {
    pub fn new(name: impl Into<String>, method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method: method.into(),
            url: url.into(),
            body: None,
            headers: IndexMap::new(),
            capture: IndexMap::new(),
            assertions: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_capture(mut self, name: impl Into<String>, expr: impl Into<String>) -> Self {
        self.capture.insert(name.into(), expr.into());
        self
    }

    pub fn with_assert(mut self, expr: impl Into<String>) -> Self {
        self.assertions.push(expr.into());
        self
    }
}

fn default_method() -> String {
    "GET".to_string()
}

/// YAML 中显式写成 `key:` 或 `key: ~` 时按缺省值处理
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 文档加载错误
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Error loading YAML file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error loading YAML file {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid YAML document: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_builder() {
        let action = Action::new("create", "POST", "{{base}}/items")
            .with_body(r#"{"id": "{{$uuid}}"}"#)
            .with_header("X-Trace", "{{trace}}")
            .with_capture("itemId", "response.data.id")
            .with_assert("response.status === 201");

        assert_eq!(action.method, "POST");
        assert_eq!(action.headers.get("X-Trace").map(String::as_str), Some("{{trace}}"));
        assert_eq!(action.capture.len(), 1);
        assert_eq!(action.assertions, vec!["response.status === 201"]);
    }

    #[test]
    fn test_document_builder() {
        let doc = RunDocument::new()
            .with_variable("id", "42")
            .with_variable("count", 3)
            .with_action(Action::new("get", "GET", "https://api.test"));

        assert_eq!(doc.variables["id"], json!("42"));
        assert_eq!(doc.variables["count"], json!(3));
        assert_eq!(doc.actions.len(), 1);
    }
}
