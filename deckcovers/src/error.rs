//! Error types for the thumbnail cache

use std::path::PathBuf;

/// Errors raised by [`crate::ThumbnailCache`]
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The artwork could not be downloaded
    #[error("Cannot fetch artwork {thumb}: {source}")]
    Fetch {
        thumb: String,
        #[source]
        source: deckplexamp::Error,
    },

    /// The cache entry could not be written
    #[error("Cannot persist {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bundled default artwork is missing or unreadable
    #[error("Cannot load default image {path}: {source}")]
    DefaultImage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CacheError {
    pub fn persist(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persist {
            path: path.into(),
            source,
        }
    }
}
