//! Error types for the Plexamp and Plex clients

/// Result type alias for Plexamp/Plex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while querying Plexamp or Plex
///
/// All of them are transient from the point of view of the sync loop: the
/// current tick is skipped and the next one issues a fresh request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed (connection refused, timeout, body read...)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("{url} returned HTTP status {status}")]
    Status { url: String, status: u16 },

    /// Timeline XML could not be decoded
    #[error("XML decoding failed: {0}")]
    Xml(#[from] quick_xml::de::DeError),

    /// Invalid base URL or artwork path
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create a status error
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }
}
