use crate::expression::format_json_number;
use crate::variable::types::VariableEnvironment;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// 模板错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unclosed placeholder starting at offset {offset}")]
    Unclosed { offset: usize },

    #[error("empty placeholder at offset {offset}")]
    EmptyPlaceholder { offset: usize },

    #[error("invalid placeholder expression '{placeholder}'")]
    InvalidPlaceholder { placeholder: String },

    #[error("unknown helper '{name}'")]
    UnknownHelper { name: String },
}

type HelperFn = Box<dyn Fn() -> String + Send + Sync>;

/// 生成器 helper 注册表
///
/// 每次渲染占位符都会重新调用 helper，结果不缓存。
pub struct HelperRegistry {
    helpers: HashMap<String, HelperFn>,
}

impl HelperRegistry {
    /// 空注册表
    pub fn empty() -> Self {
        Self {
            helpers: HashMap::new(),
        }
    }

    pub fn register<F>(&mut self, name: impl Into<String>, helper: F)
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.helpers.insert(name.into(), Box::new(helper));
    }

    pub fn call(&self, name: &str) -> Option<String> {
        self.helpers.get(name).map(|helper| helper())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }
}

impl Default for HelperRegistry {
    /// 内置 `$uuid` 与 `$guid`，两者都生成 UUID v4
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("$uuid", || uuid::Uuid::new_v4().to_string());
        registry.register("$guid", || uuid::Uuid::new_v4().to_string());
        registry
    }
}

impl fmt::Debug for HelperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.helpers.keys().collect();
        names.sort();
        f.debug_struct("HelperRegistry").field("helpers", &names).finish()
    }
}

/// 模板解析器
///
/// 支持 `{{ name }}`、`{{ user.id }}` 这样的变量路径，以及 `{{$uuid}}` 等 helper。
/// `{{{ name }}}` 与 `{{ name }}` 等价（不做 HTML 转义）。
/// 缺失的变量渲染为空字符串。
#[derive(Debug, Default)]
pub struct TemplateResolver {
    helpers: HelperRegistry,
}

impl TemplateResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_helpers(helpers: HelperRegistry) -> Self {
        Self { helpers }
    }

    pub fn helpers_mut(&mut self) -> &mut HelperRegistry {
        &mut self.helpers
    }

    /// 渲染模板，不修改变量环境
    pub fn resolve(
        &self,
        template: &str,
        env: &VariableEnvironment,
    ) -> Result<String, TemplateError> {
        let mut output = String::with_capacity(template.len());
        let mut rest = template;
        let mut offset = 0;

        while let Some(start) = rest.find("{{") {
            output.push_str(&rest[..start]);
            let open_at = offset + start;

            let (open, close) = if rest[start..].starts_with("{{{") {
                ("{{{", "}}}")
            } else {
                ("{{", "}}")
            };
            let after_open = &rest[start + open.len()..];
            let end = after_open
                .find(close)
                .ok_or(TemplateError::Unclosed { offset: open_at })?;

            let expr = after_open[..end].trim();
            output.push_str(&self.render_placeholder(expr, open_at, env)?);

            let consumed = start + open.len() + end + close.len();
            rest = &rest[consumed..];
            offset += consumed;
        }

        output.push_str(rest);
        Ok(output)
    }

    /// 模板缺省时原样返回 `None`
    pub fn resolve_optional(
        &self,
        template: Option<&str>,
        env: &VariableEnvironment,
    ) -> Result<Option<String>, TemplateError> {
        template.map(|t| self.resolve(t, env)).transpose()
    }

    fn render_placeholder(
        &self,
        expr: &str,
        offset: usize,
        env: &VariableEnvironment,
    ) -> Result<String, TemplateError> {
        if expr.is_empty() {
            return Err(TemplateError::EmptyPlaceholder { offset });
        }

        let valid = expr
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | '-'))
            && !expr.starts_with('.')
            && !expr.ends_with('.')
            && !expr.contains("..");
        if !valid {
            return Err(TemplateError::InvalidPlaceholder {
                placeholder: expr.to_string(),
            });
        }

        // helper 优先于同名变量
        if let Some(generated) = self.helpers.call(expr) {
            return Ok(generated);
        }
        if expr.starts_with('$') {
            return Err(TemplateError::UnknownHelper {
                name: expr.to_string(),
            });
        }

        Ok(env.lookup_path(expr).map(render_value).unwrap_or_default())
    }

    /// 解析并替换系统环境变量 ${VAR}，未设置的保持原样
    pub fn resolve_env_vars(text: &str) -> String {
        static ENV_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = ENV_REGEX.get_or_init(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

        re.replace_all(text, |caps: &Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .to_string()
    }
}

/// 变量值转为模板文本
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_json_number(n),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
