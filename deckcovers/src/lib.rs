//! Per-track thumbnail cache for PlexDeck
//!
//! The cache maps a track (identity and version marker, see [`CacheKey`]) to
//! an image file in the images directory. The first resolution of a key
//! downloads the artwork through an [`ArtworkSource`] and writes it; later
//! resolutions are served from disk without any network access. When a track
//! has no artwork, or the source returns no data, the bundled default image is
//! written for that key instead.
//!
//! # Example
//!
//! ```no_run
//! use deckcovers::ThumbnailCache;
//! use deckplexamp::{PlaybackSnapshot, PlexClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let plex = PlexClient::builder().build_plex()?;
//!     let cache = ThumbnailCache::new("images", "plexamp.png", plex)?;
//!
//!     let snapshot = PlaybackSnapshot::new("355914", Some("1724958934"), Some("/library/metadata/355914/thumb/1724958934"));
//!     let image = cache.resolve(&snapshot).await?;
//!     println!("{}", image.identifier());
//!
//!     cache.purge_all().await;
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;
pub mod key;

#[cfg(feature = "deckconfig")]
pub mod config_ext;

pub use cache::{ArtworkSource, CachedImage, ImageOrigin, ThumbnailCache};
pub use error::CacheError;
pub use key::CacheKey;

#[cfg(feature = "deckconfig")]
pub use config_ext::ThumbnailCacheConfigExt;
