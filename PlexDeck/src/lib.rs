//! PlexDeck: shows the artwork of the track playing in Plexamp on Stream Deck keys
//!
//! The binary wires the pieces together:
//!
//! - [`registry::SurfaceRegistry`] holds the keys currently showing the plugin
//! - [`handler::LifecycleHandler`] updates it from Stream Deck events
//! - [`sync::SyncLoop`] polls Plexamp, resolves thumbnails through
//!   [`deckcovers::ThumbnailCache`] and pushes them to the registered keys
//! - [`sync::PurgeGuard`] empties the cache at shutdown
//! - [`logs::init_logging`] installs the file logger

pub mod handler;
pub mod logs;
pub mod registry;
pub mod sync;

pub use handler::LifecycleHandler;
pub use registry::SurfaceRegistry;
pub use sync::{IdleReason, PurgeGuard, StatusSource, SurfaceSink, SyncLoop, TickOutcome};
