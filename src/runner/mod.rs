pub mod events;
pub mod executor;
pub mod reporter;
pub mod types;

pub use events::RunEvent;
pub use executor::{ActionExecutor, DEFAULT_HEADERS, merge_headers};
pub use reporter::{ConsoleReporter, EventLog, Reporter, Verbosity};
pub use types::{AbortReason, RunOutcome, RunState};
