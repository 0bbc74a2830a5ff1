use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ProtocolError, Result};
use crate::query::Query;

/// Session frames sent by the client, one JSON object per line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    /// Open the session with an API-key credential.
    Login { user_guid: Uuid, api_key: String },
    /// Start a query. Every message about it carries `request_id`.
    Query {
        request_id: Uuid,
        #[serde(flatten)]
        query: Query,
    },
    /// Close the session.
    Disconnect,
}

impl Request {
    /// Serialize to wire bytes: compact JSON followed by `\n`.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Parse a single request line (trailing `\r\n` or `\n` allowed).
    pub fn parse_line(line: &str) -> Result<Self> {
        let line = line.trim_end_matches('\n').trim_end_matches('\r');
        if line.trim().is_empty() {
            return Err(ProtocolError::InvalidMessage("empty request line".into()));
        }
        Ok(serde_json::from_str(line)?)
    }

    /// Short name for logs. Never includes the API key.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Query { .. } => "query",
            Self::Disconnect => "disconnect",
        }
    }
}
