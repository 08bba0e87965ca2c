pub mod client;
pub mod dispatcher;
pub mod request;
pub mod response;
pub mod types;

// Re-export commonly used types for convenient access
pub use client::Client;
pub use dispatcher::{Dispatcher, TransportError};
pub use request::Request;
pub use response::Response;
pub use types::{Method, Status, UrlNormalizer};
