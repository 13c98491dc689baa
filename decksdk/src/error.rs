//! Error types for the Stream Deck channel

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Launch arguments are missing or malformed
    #[error("Invalid launch arguments: {0}")]
    InvalidArguments(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The channel to the Stream Deck application is gone
    #[error("Connection error: {0}")]
    Connection(String),
}

impl Error {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }
}
