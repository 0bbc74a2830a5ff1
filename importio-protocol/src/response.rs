use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{ProtocolError, Result};
use crate::message::{MessageType, QueryMessage};

/// Session frames sent by the server, one JSON object per line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Response {
    /// Login accepted.
    Authenticated,
    /// Login refused.
    Rejected { reason: String },
    /// A message about a running query.
    Message {
        request_id: Uuid,
        #[serde(rename = "type")]
        message_type: MessageType,
        #[serde(default)]
        data: Value,
    },
}

impl Response {
    /// Parse a single response line (trailing `\r\n` or `\n` allowed).
    pub fn parse_line(line: &str) -> Result<Self> {
        let line = line.trim_end_matches('\n').trim_end_matches('\r');
        if line.trim().is_empty() {
            return Err(ProtocolError::InvalidMessage("empty response line".into()));
        }
        Ok(serde_json::from_str(line)?)
    }

    /// Serialize to wire bytes: compact JSON followed by `\n`.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Convenience constructor for a query message frame.
    pub fn message(request_id: Uuid, message_type: MessageType, data: Value) -> Self {
        Self::Message {
            request_id,
            message_type,
            data,
        }
    }

    /// Decode a `Message` frame into its request id and typed message.
    pub fn into_query_message(self) -> Result<(Uuid, QueryMessage)> {
        match self {
            Self::Message {
                request_id,
                message_type,
                data,
            } => Ok((request_id, QueryMessage::decode(message_type, data)?)),
            other => Err(ProtocolError::InvalidMessage(format!(
                "expected query message, got: {other:?}"
            ))),
        }
    }
}
