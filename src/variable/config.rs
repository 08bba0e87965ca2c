use crate::document::RunDocument;
use crate::variable::resolver::TemplateResolver;
use crate::variable::types::{RuflowConfig, VariableEnvironment};
use crate::{Result, RuflowError};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    const CONFIG_FILE: &'static str = "ruflow.toml";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<RuflowConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RuflowError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|e| {
            RuflowError::ConfigError(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// 查找并加载配置文件
    /// 查找顺序：
    /// 1. 当前目录及其父目录
    /// 2. 用户配置目录 ~/.config/ruflow/
    pub fn find_and_load() -> Option<(PathBuf, RuflowConfig)> {
        let path = Self::find_in_current_dir().or_else(Self::find_in_user_dir)?;
        match Self::load_from_path(&path) {
            Ok(config) => Some((path, config)),
            Err(e) => {
                tracing::warn!("ignoring config file: {}", e);
                None
            }
        }
    }

    fn find_in_current_dir() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let config_path = current.join(Self::CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    fn find_in_user_dir() -> Option<PathBuf> {
        let config_path = dirs::home_dir()?
            .join(".config")
            .join("ruflow")
            .join(Self::CONFIG_FILE);
        config_path.exists().then_some(config_path)
    }

    /// 构建初始变量环境
    ///
    /// 优先级（低 -> 高）：文档 `variables`、配置文件中的环境、CLI `--var`。
    /// 指定了不存在的环境名时返回错误。
    pub fn build_environment(
        document: &RunDocument,
        config: Option<&RuflowConfig>,
        env_name: Option<&str>,
        cli_vars: &[(String, String)],
    ) -> Result<VariableEnvironment> {
        let mut environment = VariableEnvironment::from_variables(&document.variables);

        if let Some(name) = env_name {
            let env = config
                .and_then(|c| c.get_environment(name))
                .ok_or_else(|| {
                    RuflowError::ConfigError(format!("Environment '{}' not found", name))
                })?;
            for (key, value) in &env.variables {
                let resolved = TemplateResolver::resolve_env_vars(value);
                environment.insert(key.clone(), Value::String(resolved));
            }
        }

        for (key, value) in cli_vars {
            environment.insert(key.clone(), Value::String(value.clone()));
        }

        Ok(environment)
    }

    /// 解析 CLI 变量参数 "key=value"
    pub fn parse_cli_var(s: &str) -> Option<(String, String)> {
        s.split_once('=')
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .filter(|(k, _)| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CONFIG: &str = r#"
[environments.dev]
base_url = "http://localhost:8080"
token = "dev-token"

[environments.prod]
base_url = "https://api.example.com"
token = "${RUFLOW_PROD_TOKEN}"
"#;

    #[test]
    fn test_load_from_path() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(CONFIG.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = ConfigLoader::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.environments.len(), 2);
        assert!(config.get_environment("dev").is_some());
    }

    #[test]
    fn test_load_invalid_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[environments.dev\n").unwrap();
        temp_file.flush().unwrap();

        let err = ConfigLoader::load_from_path(temp_file.path()).unwrap_err();
        assert!(matches!(err, RuflowError::ConfigError(_)));
    }

    #[test]
    fn test_build_environment_precedence() {
        let config: RuflowConfig = toml::from_str(CONFIG).unwrap();
        let document = RunDocument::new()
            .with_variable("base_url", "http://from-document")
            .with_variable("page", 1);

        let env = ConfigLoader::build_environment(&document, Some(&config), None, &[]).unwrap();
        assert_eq!(env.get("base_url"), Some(&json!("http://from-document")));
        assert_eq!(env.get("page"), Some(&json!(1)));

        let env =
            ConfigLoader::build_environment(&document, Some(&config), Some("dev"), &[]).unwrap();
        assert_eq!(env.get("base_url"), Some(&json!("http://localhost:8080")));
        assert_eq!(env.get("token"), Some(&json!("dev-token")));
        assert_eq!(env.get("page"), Some(&json!(1)));

        let cli_vars = vec![("token".to_string(), "custom-token".to_string())];
        let env = ConfigLoader::build_environment(&document, Some(&config), Some("dev"), &cli_vars)
            .unwrap();
        assert_eq!(env.get("token"), Some(&json!("custom-token")));
    }

    #[test]
    fn test_build_environment_unknown_env() {
        let config: RuflowConfig = toml::from_str(CONFIG).unwrap();
        let document = RunDocument::new();

        let result = ConfigLoader::build_environment(&document, Some(&config), Some("qa"), &[]);
        assert!(matches!(result, Err(RuflowError::ConfigError(_))));

        let result = ConfigLoader::build_environment(&document, None, Some("dev"), &[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_cli_var() {
        assert_eq!(
            ConfigLoader::parse_cli_var("key=value"),
            Some(("key".to_string(), "value".to_string()))
        );

        assert_eq!(
            ConfigLoader::parse_cli_var("url=https://example.com?a=b"),
            Some(("url".to_string(), "https://example.com?a=b".to_string()))
        );

        assert_eq!(ConfigLoader::parse_cli_var("invalid"), None);
        assert_eq!(ConfigLoader::parse_cli_var("=value"), None);
    }
}
