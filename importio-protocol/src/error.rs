#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("invalid endpoint: {0:?}")]
    InvalidEndpoint(String),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
