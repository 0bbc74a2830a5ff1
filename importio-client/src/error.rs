use std::time::Duration;

/// Errors that can occur during client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// TCP or socket I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame encoding or decoding error.
    #[error("protocol error: {0}")]
    Protocol(#[from] importio_rs_protocol::ProtocolError),

    /// Operation exceeded the configured timeout duration.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// Server closed the connection.
    #[error("disconnected")]
    Disconnected,

    /// Server rejected the credential.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Every connect attempt failed at the transport level.
    #[error("connect failed after {attempts} attempt(s)")]
    ConnectFailed {
        /// Number of attempts made.
        attempts: u32,
    },

    /// Method called in wrong client state (e.g., `query` after the session closed).
    #[error("invalid state: expected {expected}, actual {actual}")]
    InvalidState {
        /// The state(s) required for the operation.
        expected: &'static str,
        /// The current client state.
        actual: &'static str,
    },

    /// Server sent a frame that does not fit the session.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl ClientError {
    /// Transport failures worth another connect attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Timeout(_) | Self::Disconnected)
    }
}

/// Convenience alias for `Result<T, ClientError>`.
pub type Result<T> = std::result::Result<T, ClientError>;
