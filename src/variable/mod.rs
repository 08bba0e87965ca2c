pub mod config;
pub mod resolver;
pub mod types;

pub use config::ConfigLoader;
pub use resolver::{HelperRegistry, TemplateError, TemplateResolver};
pub use types::{Environment, HttpConfig, RESPONSE_KEY, RuflowConfig, VariableEnvironment};
