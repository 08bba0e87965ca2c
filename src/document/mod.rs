pub mod loader;
pub mod types;

pub use loader::DocumentLoader;
pub use types::{Action, DocumentError, RunDocument};

/// 从文件路径加载运行文档
pub fn load_file<P: AsRef<std::path::Path>>(path: P) -> Result<RunDocument, DocumentError> {
    DocumentLoader::load_file(path)
}

/// 从字符串内容加载运行文档
pub fn load_str(content: &str) -> Result<RunDocument, DocumentError> {
    DocumentLoader::load_str(content)
}
