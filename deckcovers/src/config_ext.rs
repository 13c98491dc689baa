//! Configuration extension for the thumbnail cache
//!
//! ```yaml
//! images:
//!   directory: images
//!   default: plexamp.png
//! ```
//!
//! The directory is kept as configured. A relative directory is resolved
//! against the working directory of the plugin, which is also how the display
//! controller resolves the image identifiers pushed to it.

use crate::cache::{ArtworkSource, ThumbnailCache};
use anyhow::Result;
use deckconfig::Config;
use serde_yaml::Value;

const DEFAULT_IMAGES_DIR: &str = "images";
const DEFAULT_IMAGE_NAME: &str = "plexamp.png";

/// Extension trait exposing the thumbnail cache settings of `deckconfig::Config`
///
/// # Example
///
/// ```rust,ignore
/// use deckconfig::Config;
/// use deckcovers::ThumbnailCacheConfigExt;
/// use deckplexamp::PlexampConfigExt;
///
/// let config = Config::load_config("")?;
/// let cache = config.create_thumbnail_cache(config.create_plex_client()?)?;
/// ```
pub trait ThumbnailCacheConfigExt {
    /// Directory holding the cache entries and the default image (default: "images")
    fn get_images_dir(&self) -> Result<String>;

    fn set_images_dir(&self, directory: String) -> Result<()>;

    /// File name of the fallback artwork inside the images directory
    /// (default: "plexamp.png")
    fn get_default_image(&self) -> Result<String>;

    fn set_default_image(&self, name: String) -> Result<()>;

    /// Builds a cache from the configured directory and default image
    ///
    /// # Arguments
    ///
    /// * `source` - Where artwork is downloaded from on a miss
    fn create_thumbnail_cache<S: ArtworkSource>(&self, source: S) -> Result<ThumbnailCache<S>>;
}

fn string_or_default(config: &Config, path: &[&str], default: &str) -> String {
    match config.get_value(path) {
        Ok(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => default.to_string(),
    }
}

impl ThumbnailCacheConfigExt for Config {
    fn get_images_dir(&self) -> Result<String> {
        Ok(string_or_default(
            self,
            &["images", "directory"],
            DEFAULT_IMAGES_DIR,
        ))
    }

    fn set_images_dir(&self, directory: String) -> Result<()> {
        self.set_value(&["images", "directory"], Value::String(directory))
    }

    fn get_default_image(&self) -> Result<String> {
        Ok(string_or_default(
            self,
            &["images", "default"],
            DEFAULT_IMAGE_NAME,
        ))
    }

    fn set_default_image(&self, name: String) -> Result<()> {
        self.set_value(&["images", "default"], Value::String(name))
    }

    fn create_thumbnail_cache<S: ArtworkSource>(&self, source: S) -> Result<ThumbnailCache<S>> {
        let dir = self.get_images_dir()?;
        let default_image = self.get_default_image()?;
        Ok(ThumbnailCache::new(dir, &default_image, source)?)
    }
}
