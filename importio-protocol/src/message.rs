use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProtocolError, Result};

/// Kind of a message the service sends about a running query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    Init,
    Start,
    Spawn,
    Stop,
    Message,
    Error,
    Unauth,
    Cancel,
    Disconnect,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::Start => "START",
            Self::Spawn => "SPAWN",
            Self::Stop => "STOP",
            Self::Message => "MESSAGE",
            Self::Error => "ERROR",
            Self::Unauth => "UNAUTH",
            Self::Cancel => "CANCEL",
            Self::Disconnect => "DISCONNECT",
        }
    }

    /// Types that end a query no matter how many jobs are still running.
    pub fn is_abort(&self) -> bool {
        matches!(
            self,
            Self::Error | Self::Unauth | Self::Cancel | Self::Disconnect
        )
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a `MESSAGE`: either result records or an error reported by the
/// external source.
#[derive(Clone, Debug, PartialEq)]
pub enum DataPayload {
    /// Records in the order the service listed them.
    Results(Vec<Value>),
    /// The payload carried an `errorType`. `detail` is the whole payload object.
    ServiceError { error_type: String, detail: Value },
}

/// One decoded message for a query.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryMessage {
    /// A `MESSAGE` carrying data.
    Data(DataPayload),
    /// Any other message type; `detail` is the raw `data` field (often null).
    Status {
        message_type: MessageType,
        detail: Value,
    },
}

impl QueryMessage {
    /// Decode the `type` and `data` fields of a wire message.
    ///
    /// Only `MESSAGE` payloads are interpreted. They must be JSON objects; an
    /// `errorType` key marks a service error, otherwise the `results` array
    /// (absent means empty) holds the records.
    pub fn decode(message_type: MessageType, data: Value) -> Result<Self> {
        if message_type != MessageType::Message {
            return Ok(Self::Status {
                message_type,
                detail: data,
            });
        }

        let Value::Object(mut map) = data else {
            return Err(ProtocolError::InvalidMessage(format!(
                "MESSAGE data must be an object, got: {data}"
            )));
        };

        if let Some(error_type) = map.get("errorType") {
            let error_type = match error_type {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Ok(Self::Data(DataPayload::ServiceError {
                error_type,
                detail: Value::Object(map),
            }));
        }

        let results = match map.remove("results") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(records)) => records,
            Some(other) => {
                return Err(ProtocolError::InvalidMessage(format!(
                    "results must be an array, got: {other}"
                )));
            }
        };
        Ok(Self::Data(DataPayload::Results(results)))
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Data(_) => MessageType::Message,
            Self::Status { message_type, .. } => *message_type,
        }
    }

    /// Returns the records of a successful data message.
    pub fn results(&self) -> Option<&[Value]> {
        match self {
            Self::Data(DataPayload::Results(records)) => Some(records),
            _ => None,
        }
    }

    /// Returns the `errorType` of a data message reporting a service error.
    pub fn service_error(&self) -> Option<&str> {
        match self {
            Self::Data(DataPayload::ServiceError { error_type, .. }) => Some(error_type),
            _ => None,
        }
    }

    /// A synthetic terminal message used when the session ends under a query.
    pub fn disconnected() -> Self {
        Self::Status {
            message_type: MessageType::Disconnect,
            detail: Value::Null,
        }
    }
}

impl fmt::Display for QueryMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(DataPayload::Results(records)) => {
                write!(f, "MESSAGE {}", Value::Array(records.clone()))
            }
            Self::Data(DataPayload::ServiceError { error_type, detail }) => {
                write!(f, "MESSAGE errorType={error_type} {detail}")
            }
            Self::Status {
                message_type,
                detail: Value::Null,
            } => write!(f, "{message_type}"),
            Self::Status {
                message_type,
                detail,
            } => write!(f, "{message_type} {detail}"),
        }
    }
}
