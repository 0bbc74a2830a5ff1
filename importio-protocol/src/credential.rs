use std::fmt;

use uuid::Uuid;

use crate::error::{ProtocolError, Result};

/// Endpoint used when none is given.
pub const DEFAULT_HOST: &str = "import.io";

/// Port appended to an endpoint that does not name one.
pub const DEFAULT_PORT: u16 = 80;

/// API-key credential for one session.
///
/// The API key is never printed: `Debug` redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    user_guid: Uuid,
    api_key: String,
    host: String,
}

impl Credential {
    /// Create a credential for the default endpoint.
    pub fn new(user_guid: Uuid, api_key: impl Into<String>) -> Self {
        Self::with_host(user_guid, api_key, DEFAULT_HOST)
    }

    /// Create a credential for a specific endpoint (`host` or `host:port`).
    pub fn with_host(user_guid: Uuid, api_key: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            user_guid,
            api_key: api_key.into(),
            host: host.into(),
        }
    }

    pub fn user_guid(&self) -> Uuid {
        self.user_guid
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Resolve the endpoint to a `host:port` string suitable for a TCP connect.
    ///
    /// A bare host gets [`DEFAULT_PORT`]. A trailing `:port` must be numeric.
    pub fn address(&self) -> Result<String> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(ProtocolError::InvalidEndpoint(self.host.clone()));
        }
        match host.rsplit_once(':') {
            Some((name, port)) => {
                if name.is_empty() || port.parse::<u16>().is_err() {
                    return Err(ProtocolError::InvalidEndpoint(self.host.clone()));
                }
                Ok(host.to_owned())
            }
            None => Ok(format!("{host}:{DEFAULT_PORT}")),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("user_guid", &self.user_guid)
            .field("api_key", &"<redacted>")
            .field("host", &self.host)
            .finish()
    }
}
