//! Async client for the import.io hosted query service.
//!
//! Connect with an API-key credential, submit queries, and receive their
//! messages through a callback or a stream. [`QueryRunner`] aggregates the
//! results of a batch of queries and waits for all of them to finish.

pub mod callback;
pub(crate) mod connection;
pub(crate) mod dispatch;
pub mod error;
pub mod retry;
pub mod runner;
pub mod state;
pub mod stream;

mod client;
#[cfg(test)]
pub(crate) mod mock;

pub use callback::MessageCallback;
pub use client::ImportIoClient;
pub use error::{ClientError, Result};
pub use retry::RetryConfig;
pub use runner::{QueryRunner, RunReport, ServiceError};
pub use state::{ClientConfig, ClientState};
pub use stream::{QueryEvent, QueryEvents};

pub use importio_rs_protocol::{Credential, DataPayload, MessageType, Progress, Query, QueryMessage};
