use std::time::Duration;

use crate::retry::RetryConfig;

/// Client session state machine.
///
/// Transitions: `Connected` ⇄ `Querying` → `Disconnected`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientState {
    /// Logged in, no query outstanding.
    Connected,
    /// At least one submitted query has not finished yet.
    Querying,
    /// Session closed by [`disconnect`](crate::ImportIoClient::disconnect) or by the server.
    Disconnected,
}

impl ClientState {
    /// Returns the state name as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "Connected",
            Self::Querying => "Querying",
            Self::Disconnected => "Disconnected",
        }
    }
}

/// Configuration for [`ImportIoClient`](crate::ImportIoClient) sessions.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Timeout for the initial TCP connection. Default: 10 seconds.
    pub connect_timeout: Duration,
    /// Timeout for the login reply, and for the server to close the session
    /// after a disconnect request. Default: 30 seconds.
    pub read_timeout: Duration,
    /// Retry policy for transport failures during connect.
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }
}
