//! Configuration extension for the Plexamp and Plex clients
//!
//! Adds the endpoint settings to `deckconfig::Config`:
//!
//! ```yaml
//! plexamp:
//!   url: http://localhost:63460
//! plex:
//!   url: http://192.168.1.100:32401
//! http:
//!   timeout_secs: 5
//! ```

use crate::client::{ClientBuilder, DEFAULT_PLEX_URL, DEFAULT_PLEXAMP_URL, PlexClient, PlexampClient};
use anyhow::Result;
use deckconfig::Config;
use serde_yaml::Value;
use std::time::Duration;

/// Extension trait exposing the Plexamp/Plex endpoints of `deckconfig::Config`
pub trait PlexampConfigExt {
    /// Base address of the Plexamp player (default: `http://localhost:63460`)
    fn get_plexamp_url(&self) -> Result<String>;

    fn set_plexamp_url(&self, url: String) -> Result<()>;

    /// Base address of the Plex Media Server serving artwork
    /// (default: `http://192.168.1.100:32401`)
    fn get_plex_url(&self) -> Result<String>;

    fn set_plex_url(&self, url: String) -> Result<()>;

    /// Builds the Plexamp status client from the configuration
    fn create_plexamp_client(&self) -> Result<PlexampClient>;

    /// Builds the Plex artwork client from the configuration
    fn create_plex_client(&self) -> Result<PlexClient>;
}

fn string_or_default(config: &Config, path: &[&str], default: &str) -> String {
    match config.get_value(path) {
        Ok(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => default.to_string(),
    }
}

fn builder(config: &Config) -> Result<ClientBuilder> {
    let timeout = Duration::from_secs(config.get_http_timeout_secs()?);
    Ok(ClientBuilder::new().timeout(timeout))
}

impl PlexampConfigExt for Config {
    fn get_plexamp_url(&self) -> Result<String> {
        Ok(string_or_default(self, &["plexamp", "url"], DEFAULT_PLEXAMP_URL))
    }

    fn set_plexamp_url(&self, url: String) -> Result<()> {
        self.set_value(&["plexamp", "url"], Value::String(url))
    }

    fn get_plex_url(&self) -> Result<String> {
        Ok(string_or_default(self, &["plex", "url"], DEFAULT_PLEX_URL))
    }

    fn set_plex_url(&self, url: String) -> Result<()> {
        self.set_value(&["plex", "url"], Value::String(url))
    }

    fn create_plexamp_client(&self) -> Result<PlexampClient> {
        Ok(builder(self)?
            .base_url(self.get_plexamp_url()?)
            .build_plexamp()?)
    }

    fn create_plex_client(&self) -> Result<PlexClient> {
        Ok(builder(self)?.base_url(self.get_plex_url()?).build_plex()?)
    }
}
