use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::http::Response;

/// 保留变量名：最近一次 HTTP 响应
pub const RESPONSE_KEY: &str = "response";

/// 变量环境
///
/// 整个运行过程中只有一个实例，由执行器持有。变量只会新增或覆盖，不会删除。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableEnvironment {
    variables: IndexMap<String, Value>,
}

impl VariableEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以文档的初始变量创建环境
    pub fn from_variables(variables: &IndexMap<String, Value>) -> Self {
        Self {
            variables: variables.clone(),
        }
    }

    /// 插入或覆盖变量，返回旧值
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.variables.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.variables.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }

    /// 按点号路径查找，例如 `user.id`、`items.0.name`
    pub fn lookup_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.variables.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// 用最新的响应覆盖 `response`
    pub fn set_response(&mut self, response: &Response) {
        self.variables
            .insert(RESPONSE_KEY.to_string(), response.to_value());
    }

    pub fn response(&self) -> Option<&Value> {
        self.variables.get(RESPONSE_KEY)
    }

    /// 批量插入变量（后写覆盖）
    pub fn extend<I, K>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        for (key, value) in vars {
            self.variables.insert(key.into(), value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// 环境配置
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Environment {
    /// 变量映射
    #[serde(flatten)]
    pub variables: HashMap<String, String>,
}

/// HTTP 客户端配置
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct HttpConfig {
    /// 请求超时（秒），缺省使用 reqwest 默认行为（无超时）
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl HttpConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// `ruflow.toml` 配置文件
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RuflowConfig {
    #[serde(default)]
    pub http: HttpConfig,

    /// 所有环境配置
    #[serde(default)]
    pub environments: HashMap<String, Environment>,
}

impl RuflowConfig {
    pub fn get_environment(&self, env_name: &str) -> Option<&Environment> {
        self.environments.get(env_name)
    }
}
