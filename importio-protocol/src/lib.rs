//! Query, message, and session frame types for the import.io query client.
//!
//! This crate holds the data model shared by the client and the example
//! program. It performs no I/O.

pub mod credential;
pub mod error;
pub mod message;
pub mod progress;
pub mod query;
pub mod request;
pub mod response;

pub use credential::Credential;
pub use error::{ProtocolError, Result};
pub use message::{DataPayload, MessageType, QueryMessage};
pub use progress::Progress;
pub use query::Query;
pub use request::Request;
pub use response::Response;
