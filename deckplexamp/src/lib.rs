//! Plexamp and Plex clients for PlexDeck
//!
//! This crate provides the two HTTP collaborators of the PlexDeck sync loop:
//!
//! - [`PlexampClient`] polls the player's timeline
//!   (`/player/timeline/poll?wait=0&includeMetadata=1&commandID=1`) and
//!   turns the `MediaContainer` XML into a typed [`PlaybackSnapshot`]
//! - [`PlexClient`] downloads the artwork referenced by the snapshot from the
//!   Plex Media Server
//!
//! Both are stateless request/response wrappers. Failures are reported as
//! [`Error`] and the caller decides what to do with them; nothing is retried.
//!
//! # Example
//!
//! ```no_run
//! use deckplexamp::PlexampClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PlexampClient::builder().build_plexamp()?;
//!     match client.current_snapshot().await? {
//!         Some(track) => println!("{} ({:?})", track.rating_key, track.title),
//!         None => println!("nothing playing"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod models;

#[cfg(feature = "deckconfig")]
pub mod config_ext;

pub use client::{ClientBuilder, PlexClient, PlexampClient};
pub use error::{Error, Result};
pub use models::{MediaContainer, PlaybackSnapshot, PlaybackState, Timeline, Track};

#[cfg(feature = "deckconfig")]
pub use config_ext::PlexampConfigExt;
