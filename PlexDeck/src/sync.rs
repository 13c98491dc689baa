//! Periodic Plexamp → Stream Deck synchronisation
//!
//! Every tick:
//!
//! 1. poll Plexamp for the current music track
//! 2. nothing playing, or Plexamp unreachable: stay idle (keys keep their last image)
//! 3. resolve the track's thumbnail through the cache; failure: stay idle
//! 4. push the image identifier to every registered key
//!
//! Ticks never overlap: a tick runs to completion before the next one is
//! awaited, and ticks missed meanwhile are skipped.

use crate::registry::SurfaceRegistry;
use async_trait::async_trait;
use deckcovers::{ArtworkSource, CacheKey, ThumbnailCache};
use deckplexamp::{PlaybackSnapshot, PlexampClient};
use decksdk::StreamDeckHandle;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Where the sync loop learns what is playing
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn current_snapshot(&self) -> deckplexamp::Result<Option<PlaybackSnapshot>>;
}

#[async_trait]
impl StatusSource for PlexampClient {
    async fn current_snapshot(&self) -> deckplexamp::Result<Option<PlaybackSnapshot>> {
        PlexampClient::current_snapshot(self).await
    }
}

#[async_trait]
impl<T: StatusSource + ?Sized> StatusSource for Arc<T> {
    async fn current_snapshot(&self) -> deckplexamp::Result<Option<PlaybackSnapshot>> {
        (**self).current_snapshot().await
    }
}

/// Where the sync loop pushes images
pub trait SurfaceSink: Send + Sync {
    fn set_image(&self, surface: &str, identifier: &str) -> decksdk::Result<()>;
}

impl SurfaceSink for StreamDeckHandle {
    fn set_image(&self, surface: &str, identifier: &str) -> decksdk::Result<()> {
        StreamDeckHandle::set_image(self, surface, identifier)
    }
}

impl<T: SurfaceSink + ?Sized> SurfaceSink for Arc<T> {
    fn set_image(&self, surface: &str, identifier: &str) -> decksdk::Result<()> {
        (**self).set_image(surface, identifier)
    }
}

/// Why a tick did not display anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleReason {
    /// Plexamp could not be queried or its answer could not be decoded
    StatusUnavailable,
    /// No music track in the timeline
    NothingPlaying,
    /// The thumbnail could not be fetched or written
    ResolveFailed,
}

/// Result of one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Idle(IdleReason),
    Displaying {
        identifier: String,
        /// Number of keys the image was pushed to
        surfaces: usize,
        /// Number of pushes that failed
        failed: usize,
    },
}

/// Shortest accepted tick period
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

pub struct SyncLoop<P, S, D> {
    status: P,
    cache: Arc<ThumbnailCache<S>>,
    registry: Arc<SurfaceRegistry>,
    sink: D,
    interval: Duration,
    current: Mutex<Option<CacheKey>>,
}

impl<P, S, D> SyncLoop<P, S, D>
where
    P: StatusSource,
    S: ArtworkSource,
    D: SurfaceSink,
{
    pub fn new(
        status: P,
        cache: Arc<ThumbnailCache<S>>,
        registry: Arc<SurfaceRegistry>,
        sink: D,
        interval: Duration,
    ) -> Self {
        // tokio::time::interval panics on a zero period.
        if interval < MIN_INTERVAL {
            warn!(interval_ms = interval.as_millis() as u64, "Sync interval too short, using 1 ms");
        }
        Self {
            status,
            cache,
            registry,
            sink,
            interval: interval.max(MIN_INTERVAL),
            current: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs one synchronisation step
    pub async fn tick(&self) -> TickOutcome {
        let snapshot = match self.status.current_snapshot().await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                trace!("No music track playing");
                return TickOutcome::Idle(IdleReason::NothingPlaying);
            }
            Err(e) => {
                debug!("Plexamp status unavailable: {}", e);
                return TickOutcome::Idle(IdleReason::StatusUnavailable);
            }
        };

        let image = match self.cache.resolve(&snapshot).await {
            Ok(image) => image,
            Err(e) => {
                warn!(track = %snapshot.rating_key, "Cannot resolve thumbnail: {}", e);
                return TickOutcome::Idle(IdleReason::ResolveFailed);
            }
        };

        self.note_track(&snapshot, &image.key);

        let identifier = image.identifier();
        let surfaces = self.registry.members();
        let mut failed = 0;
        for surface in &surfaces {
            if let Err(e) = self.sink.set_image(surface, &identifier) {
                failed += 1;
                warn!(surface = %surface, "Cannot push image: {}", e);
            }
        }
        trace!(identifier = %identifier, surfaces = surfaces.len(), failed, "Image pushed");

        TickOutcome::Displaying {
            identifier,
            surfaces: surfaces.len(),
            failed,
        }
    }

    /// Ticks every `interval` until `token` is cancelled
    pub async fn run(&self, token: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval_ms = self.interval.as_millis() as u64, "Sync loop started");

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = self.tick() => {}
                    }
                }
            }
        }

        info!("Sync loop stopped");
    }

    fn note_track(&self, snapshot: &PlaybackSnapshot, key: &CacheKey) {
        let mut current = self.current.lock().unwrap();
        if current.as_ref() != Some(key) {
            info!(
                key = %key,
                state = snapshot.state.as_str(),
                title = snapshot.title.as_deref().unwrap_or_default(),
                artist = snapshot.artist.as_deref().unwrap_or_default(),
                album = snapshot.album.as_deref().unwrap_or_default(),
                "Now playing"
            );
            *current = Some(key.clone());
        }
    }
}

/// Purges the thumbnail cache when the process shuts down
///
/// [`PurgeGuard::purge`] is the normal path; dropping an unused guard (early
/// return, panic unwinding) purges synchronously instead.
pub struct PurgeGuard<S> {
    cache: Option<Arc<ThumbnailCache<S>>>,
}

impl<S> PurgeGuard<S> {
    pub fn new(cache: Arc<ThumbnailCache<S>>) -> Self {
        Self { cache: Some(cache) }
    }

    /// Purges now and disarms the guard. Returns the number of files removed.
    pub async fn purge(mut self) -> usize {
        match self.cache.take() {
            Some(cache) => cache.purge_all().await,
            None => 0,
        }
    }
}

impl<S> Drop for PurgeGuard<S> {
    fn drop(&mut self) {
        if let Some(cache) = self.cache.take() {
            cache.purge_all_blocking();
        }
    }
}
