//! HTTP clients for Plexamp and the Plex Media Server
//!
//! Both clients are stateless: one call issues one request and translates one
//! response. There is no retry and no backoff, the caller simply asks again
//! on its next tick.
//!
//! # Example
//!
//! ```no_run
//! use deckplexamp::{ClientBuilder, PlexClient, PlexampClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let plexamp = PlexampClient::builder().base_url("http://localhost:63460").build_plexamp()?;
//!     let plex = ClientBuilder::new().base_url("http://192.168.1.100:32401").build_plex()?;
//!
//!     if let Some(snapshot) = plexamp.current_snapshot().await? {
//!         if let Some(thumb) = &snapshot.thumb {
//!             let bytes = plex.fetch_thumbnail(thumb).await?;
//!             println!("{} bytes of artwork", bytes.map(|b| b.len()).unwrap_or(0));
//!         }
//!     }
//!     Ok(())
//! }
//! ```

use crate::error::{Error, Result};
use crate::models::{MediaContainer, PlaybackSnapshot};
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Default Plexamp (headless player) address
pub const DEFAULT_PLEXAMP_URL: &str = "http://localhost:63460";

/// Default Plex Media Server address
pub const DEFAULT_PLEX_URL: &str = "http://192.168.1.100:32401";

/// Default timeout for HTTP requests (5 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = concat!("PlexDeck/", env!("CARGO_PKG_VERSION"));

/// Path and query of the non-blocking timeline poll
pub const TIMELINE_POLL_PATH: &str =
    "/player/timeline/poll?wait=0&includeMetadata=1&commandID=1";

/// Plexamp endpoint answering when the player is up
pub const PLEXAMP_RESOURCES_PATH: &str = "/resources";

/// Plex Media Server endpoint answering when the server is up
pub const PLEX_IDENTITY_PATH: &str = "/identity";

/// Plexamp status client
///
/// Queries the player's timeline and turns it into a [`PlaybackSnapshot`].
#[derive(Debug, Clone)]
pub struct PlexampClient {
    client: Client,
    base_url: String,
}

impl PlexampClient {
    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the raw timeline document
    pub async fn poll_timeline(&self) -> Result<MediaContainer> {
        let url = join_url(&self.base_url, TIMELINE_POLL_PATH)?;
        let body = get_checked(&self.client, &url).await?.text().await?;
        MediaContainer::parse(&body)
    }

    /// Fetches the timeline and extracts the music track, if any
    pub async fn current_snapshot(&self) -> Result<Option<PlaybackSnapshot>> {
        let container = self.poll_timeline().await?;
        let snapshot = container.music_snapshot();
        tracing::trace!(
            timelines = container.timelines.len(),
            music = snapshot.is_some(),
            "Polled Plexamp timeline"
        );
        Ok(snapshot)
    }

    /// Checks that Plexamp answers
    pub async fn verify_connection(&self) -> Result<()> {
        let url = join_url(&self.base_url, PLEXAMP_RESOURCES_PATH)?;
        get_checked(&self.client, &url).await?;
        tracing::debug!(url = %url, "Plexamp is reachable");
        Ok(())
    }
}

/// Plex Media Server artwork client
#[derive(Debug, Clone)]
pub struct PlexClient {
    client: Client,
    base_url: String,
}

impl PlexClient {
    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Downloads the artwork at `thumb` (a server-relative path).
    ///
    /// Returns `Ok(None)` when the server answers with an empty body.
    pub async fn fetch_thumbnail(&self, thumb: &str) -> Result<Option<Bytes>> {
        let url = join_url(&self.base_url, thumb)?;
        let bytes = get_checked(&self.client, &url).await?.bytes().await?;
        tracing::debug!(url = %url, size = bytes.len(), "Fetched thumbnail");

        if bytes.is_empty() {
            Ok(None)
        } else {
            Ok(Some(bytes))
        }
    }

    /// Checks that the Plex Media Server answers
    pub async fn verify_connection(&self) -> Result<()> {
        let url = join_url(&self.base_url, PLEX_IDENTITY_PATH)?;
        get_checked(&self.client, &url).await?;
        tracing::debug!(url = %url, "Plex Media Server is reachable");
        Ok(())
    }
}

/// Concatenates a base address and a server-relative path.
///
/// Plex artwork paths are absolute paths (`/library/metadata/...`) that must
/// be appended to the base, not resolved against it.
fn join_url(base: &str, path: &str) -> Result<String> {
    let joined = if path.is_empty() || path.starts_with('/') {
        format!("{}{}", base.trim_end_matches('/'), path)
    } else {
        format!("{}/{}", base.trim_end_matches('/'), path)
    };
    Url::parse(&joined)?;
    Ok(joined)
}

async fn get_checked(client: &Client, url: &str) -> Result<reqwest::Response> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::status(url, status.as_u16()));
    }
    Ok(response)
}

/// Builder for configuring a [`PlexampClient`] or a [`PlexClient`]
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    base_url: Option<String>,
    timeout: Duration,
    user_agent: String,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            base_url: None,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client
    ///
    /// Useful for sharing a connection pool between both clients
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build a Plexamp status client
    pub fn build_plexamp(self) -> Result<PlexampClient> {
        let (client, base_url) = self.finish(DEFAULT_PLEXAMP_URL)?;
        Ok(PlexampClient { client, base_url })
    }

    /// Build a Plex artwork client
    pub fn build_plex(self) -> Result<PlexClient> {
        let (client, base_url) = self.finish(DEFAULT_PLEX_URL)?;
        Ok(PlexClient { client, base_url })
    }

    fn finish(self, default_base: &str) -> Result<(Client, String)> {
        let base_url = self.base_url.unwrap_or_else(|| default_base.to_string());
        Url::parse(&base_url)?;

        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(&self.user_agent)
                .timeout(self.timeout)
                .build()?,
        };

        Ok((client, base_url.trim_end_matches('/').to_string()))
    }
}
