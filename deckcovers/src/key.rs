//! Cache keys and on-disk naming
//!
//! A cache entry is addressed by the pair (track identity, version marker).
//! The file name is `thumb_<identity>_<version>.png`. Both components are
//! escaped so that the result is collision-free:
//!
//! - ASCII letters, digits and `-` are kept as is
//! - every other byte is written as `%XX` (uppercase hex)
//! - an absent version is written as `~`, which escaping never produces
//!
//! `_` is escaped too, so it only ever appears as the separator.

use deckplexamp::PlaybackSnapshot;
use std::fmt;

/// Prefix shared by every cache file
pub const ENTRY_PREFIX: &str = "thumb_";

/// Storage suffix of cache files
pub const ENTRY_EXTENSION: &str = "png";

/// Suffix of partially written entries
pub const PARTIAL_EXTENSION: &str = "part";

const MISSING_VERSION: &str = "~";

/// Identity of one cached thumbnail
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    identity: String,
    version: Option<String>,
}

impl CacheKey {
    pub fn new(identity: impl Into<String>, version: Option<String>) -> Self {
        Self {
            identity: identity.into(),
            version,
        }
    }

    /// Derives the key of the track described by `snapshot`
    pub fn from_snapshot(snapshot: &PlaybackSnapshot) -> Self {
        Self::new(snapshot.rating_key.clone(), snapshot.version.clone())
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// File name without the storage suffix, e.g. `thumb_355914_1724958934`
    pub fn file_stem(&self) -> String {
        let version = match &self.version {
            Some(v) => escape(v),
            None => MISSING_VERSION.to_string(),
        };
        format!("{ENTRY_PREFIX}{}_{version}", escape(&self.identity))
    }

    /// File name of the entry, e.g. `thumb_355914_1724958934.png`
    pub fn file_name(&self) -> String {
        format!("{}.{ENTRY_EXTENSION}", self.file_stem())
    }

    /// Hidden file the entry is written to before being renamed into place
    pub fn partial_file_name(&self) -> String {
        format!(".{}.{PARTIAL_EXTENSION}", self.file_name())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}",
            self.identity,
            self.version.as_deref().unwrap_or(MISSING_VERSION)
        )
    }
}

/// Returns true for files that belong to the cache namespace
pub fn is_cache_file(file_name: &str) -> bool {
    let entry = file_name.starts_with(ENTRY_PREFIX)
        && file_name.ends_with(&format!(".{ENTRY_EXTENSION}"));
    let partial = file_name.starts_with(&format!(".{ENTRY_PREFIX}"))
        && file_name.ends_with(&format!(".{PARTIAL_EXTENSION}"));
    entry || partial
}

fn escape(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for byte in component.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}
