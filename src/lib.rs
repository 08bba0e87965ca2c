pub mod document;
pub mod error;
pub mod expression;
pub mod http;
pub mod logger;
pub mod runner;
pub mod utils;
pub mod variable;

// Re-export commonly used types
pub use document::{Action, RunDocument};
pub use error::{Result, RuflowError};
pub use runner::{AbortReason, ActionExecutor, RunOutcome, RunState};
pub use variable::VariableEnvironment;
