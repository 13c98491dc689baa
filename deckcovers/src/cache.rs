//! Thumbnail cache
//!
//! Stores one image file per [`CacheKey`] in the images directory. An entry is
//! written once, on the first miss for its key, and is served from disk for
//! every later resolution of the same key. Entries live until [`ThumbnailCache::purge_all`]
//! is called at shutdown; there is no eviction while the process runs.
//!
//! The bundled default artwork lives in the same directory but outside the
//! `thumb_*` namespace, so purging never touches it.

use crate::error::CacheError;
use crate::key::{CacheKey, is_cache_file};
use async_trait::async_trait;
use bytes::Bytes;
use deckplexamp::{PlaybackSnapshot, PlexClient};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Where cache misses get their bytes from
#[async_trait]
pub trait ArtworkSource: Send + Sync {
    /// Downloads the artwork at `thumb`.
    ///
    /// `Ok(None)` means the source answered without data; the cache then
    /// falls back to the default image.
    async fn fetch_artwork(&self, thumb: &str) -> deckplexamp::Result<Option<Bytes>>;
}

#[async_trait]
impl ArtworkSource for PlexClient {
    async fn fetch_artwork(&self, thumb: &str) -> deckplexamp::Result<Option<Bytes>> {
        self.fetch_thumbnail(thumb).await
    }
}

#[async_trait]
impl<S: ArtworkSource + ?Sized> ArtworkSource for Arc<S> {
    async fn fetch_artwork(&self, thumb: &str) -> deckplexamp::Result<Option<Bytes>> {
        (**self).fetch_artwork(thumb).await
    }
}

/// How a resolution was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOrigin {
    /// The entry already existed, nothing was fetched
    Cached,
    /// The artwork was downloaded and written
    Fetched,
    /// The default artwork was written for this key
    Default,
}

/// A resolved cache entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedImage {
    pub key: CacheKey,
    pub path: PathBuf,
    pub origin: ImageOrigin,
}

impl CachedImage {
    /// Identifier pushed to the display: the entry path without its storage suffix
    pub fn identifier(&self) -> String {
        self.path.with_extension("").to_string_lossy().to_string()
    }
}

/// Per-track thumbnail cache
///
/// Resolution is serialized per key: concurrent resolutions of the same
/// missing key perform a single fetch and a single write, the others wait and
/// are then served from disk.
pub struct ThumbnailCache<S> {
    dir: PathBuf,
    default_path: PathBuf,
    default_image: Bytes,
    source: S,
    in_flight: Mutex<HashMap<CacheKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S: ArtworkSource> ThumbnailCache<S> {
    /// Creates the cache.
    ///
    /// `default_image` is read once from `dir` and kept in memory; a missing
    /// default image is an error.
    ///
    /// # Arguments
    ///
    /// * `dir` - Images directory (created if needed)
    /// * `default_image` - File name of the bundled fallback artwork inside `dir`
    /// * `source` - Where artwork is downloaded from on a miss
    pub fn new(dir: impl Into<PathBuf>, default_image: &str, source: S) -> Result<Self, CacheError> {
        let dir = dir.into();
        let default_path = dir.join(default_image);

        std::fs::create_dir_all(&dir).map_err(|e| CacheError::persist(&dir, e))?;
        let default_image = std::fs::read(&default_path)
            .map(Bytes::from)
            .map_err(|source| CacheError::DefaultImage {
                path: default_path.clone(),
                source,
            })?;

        tracing::debug!(
            dir = %dir.display(),
            default = %default_path.display(),
            size = default_image.len(),
            "Thumbnail cache ready"
        );

        Ok(Self {
            dir,
            default_path,
            default_image,
            source,
            in_flight: Mutex::new(HashMap::new()),
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.dir
    }

    pub fn default_image_path(&self) -> &Path {
        &self.default_path
    }

    /// Bytes of the fallback artwork
    pub fn default_image(&self) -> &Bytes {
        &self.default_image
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Path of the entry for `key`, whether or not it exists
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Returns the entry for `key` if it is already on disk
    pub async fn lookup(&self, key: &CacheKey) -> Option<CachedImage> {
        let path = self.entry_path(key);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Some(CachedImage {
                key: key.clone(),
                path,
                origin: ImageOrigin::Cached,
            }),
            _ => None,
        }
    }

    /// Returns the cached image for the track in `snapshot`, fetching and
    /// persisting it on the first miss.
    pub async fn resolve(&self, snapshot: &PlaybackSnapshot) -> Result<CachedImage, CacheError> {
        let key = CacheKey::from_snapshot(snapshot);

        if let Some(hit) = self.lookup(&key).await {
            return Ok(hit);
        }

        let claim = self.claim(&key);
        let _guard = claim.lock().await;
        // Another resolution may have written the entry while we waited.
        match self.lookup(&key).await {
            Some(hit) => Ok(hit),
            None => self.fill(&key, snapshot.thumb.as_deref()).await,
        }
    }

    async fn fill(&self, key: &CacheKey, thumb: Option<&str>) -> Result<CachedImage, CacheError> {
        let fetched = match thumb {
            Some(thumb) => self
                .source
                .fetch_artwork(thumb)
                .await
                .map_err(|source| CacheError::Fetch {
                    thumb: thumb.to_string(),
                    source,
                })?,
            None => None,
        };

        let (bytes, origin) = match fetched {
            Some(bytes) => (bytes, ImageOrigin::Fetched),
            None => (self.default_image.clone(), ImageOrigin::Default),
        };

        let path = self.entry_path(key);
        let partial = self.dir.join(key.partial_file_name());
        tokio::fs::write(&partial, &bytes)
            .await
            .map_err(|e| CacheError::persist(&partial, e))?;
        if let Err(e) = tokio::fs::rename(&partial, &path).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(CacheError::persist(&path, e));
        }

        tracing::debug!(
            key = %key,
            path = %path.display(),
            size = bytes.len(),
            origin = ?origin,
            "Thumbnail cached"
        );

        Ok(CachedImage {
            key: key.clone(),
            path,
            origin,
        })
    }

    fn claim<'a>(&'a self, key: &'a CacheKey) -> KeyClaim<'a, S> {
        let lock = self.in_flight.lock().unwrap().entry(key.clone()).or_default().clone();
        KeyClaim {
            cache: self,
            key,
            lock,
        }
    }
}

/// Holds the per-key lock of a miss and forgets the key once the last
/// claimant is gone, including when the resolving future is dropped.
struct KeyClaim<'a, S> {
    cache: &'a ThumbnailCache<S>,
    key: &'a CacheKey,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl<S> KeyClaim<'_, S> {
    async fn lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.lock.lock().await
    }
}

impl<S> Drop for KeyClaim<'_, S> {
    fn drop(&mut self) {
        let mut in_flight = self.cache.in_flight.lock().unwrap();
        // Held by the map and by this claim only: nobody else wants the key.
        if Arc::strong_count(&self.lock) == 2 {
            in_flight.remove(self.key);
        }
    }
}

impl<S> ThumbnailCache<S> {
    /// Lists the entries currently on disk
    pub fn entries(&self) -> Vec<PathBuf> {
        let Ok(read_dir) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        let mut entries: Vec<PathBuf> = read_dir
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| is_cache_file(name) && !name.starts_with('.'))
            })
            .map(|entry| entry.path())
            .collect();
        entries.sort();
        entries
    }

    /// Removes every file of the cache namespace.
    ///
    /// Best effort: failures are logged and skipped. The default image is
    /// never removed. Returns the number of files deleted.
    pub async fn purge_all(&self) -> usize {
        let dir = self.dir.clone();
        match tokio::task::spawn_blocking(move || purge_dir(&dir)).await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!("Thumbnail purge task failed: {}", e);
                0
            }
        }
    }

    /// Blocking variant of [`ThumbnailCache::purge_all`], usable from `Drop`
    pub fn purge_all_blocking(&self) -> usize {
        purge_dir(&self.dir)
    }
}

fn purge_dir(dir: &Path) -> usize {
    let read_dir = match std::fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), "Cannot list thumbnail cache: {}", e);
            return 0;
        }
    };

    let mut removed = 0;
    for entry in read_dir.filter_map(|entry| entry.ok()) {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if !is_cache_file(name) {
            continue;
        }
        match std::fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!(file = %name, "Cannot remove cached thumbnail: {}", e),
        }
    }

    tracing::info!(dir = %dir.display(), removed, "Thumbnail cache purged");
    removed
}
