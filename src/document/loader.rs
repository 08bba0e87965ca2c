use std::fs;
use std::path::Path;

use crate::document::types::{DocumentError, RunDocument};

/// YAML 文档加载器
pub struct DocumentLoader;

impl DocumentLoader {
    /// 从文件加载
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<RunDocument, DocumentError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let document = Self::parse(&content).map_err(|source| DocumentError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(
            path = %path.display(),
            actions = document.actions.len(),
            variables = document.variables.len(),
            "document loaded"
        );
        Ok(document)
    }

    /// 从字符串加载
    pub fn load_str(content: &str) -> Result<RunDocument, DocumentError> {
        Ok(Self::parse(content)?)
    }

    fn parse(content: &str) -> Result<RunDocument, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(RunDocument::default());
        }
        // 空文档或 `~` 视为没有任何动作
        let document: Option<RunDocument> = serde_yaml::from_str(content)?;
        Ok(document.unwrap_or_default())
    }
}
