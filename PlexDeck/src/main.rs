use anyhow::{Context, Result};
use deckconfig::Config;
use deckcovers::ThumbnailCacheConfigExt;
use deckplexamp::{PlexClient, PlexampClient, PlexampConfigExt};
use decksdk::{RegistrationParams, StreamDeck};
use plexdeck::logs::init_logging;
use plexdeck::{LifecycleHandler, PurgeGuard, SurfaceRegistry, SyncLoop};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // ========== Startup ==========
    let config = Arc::new(Config::load_config("")?);
    let logs = init_logging(&config)?;

    // Config loading logged before the subscriber existed.
    info!(
        args = ?std::env::args().collect::<Vec<_>>(),
        config_dir = config.directory(),
        config_file = %Path::new(config.directory()).join("config.yaml").display(),
        log_file = %logs.log_file().display(),
        level = %logs.max_level(),
        "PlexDeck starting"
    );

    let result = run(&config).await;
    if let Err(e) = &result {
        error!("PlexDeck stopped: {:#}", e);
    }
    result
}

async fn run(config: &Config) -> Result<()> {
    let params = RegistrationParams::from_env()?;
    match params.info() {
        Ok(Some(info)) => info!(
            application = %info.application.version,
            platform = %info.application.platform,
            plugin = %info.plugin.version,
            devices = info.devices.len(),
            "Stream Deck info"
        ),
        Ok(None) => {}
        Err(e) => warn!("Cannot decode Stream Deck info: {}", e),
    }

    let interval_ms = config.get_sync_interval_ms()?;
    if interval_ms == 0 {
        anyhow::bail!("sync.interval_ms must be greater than 0");
    }

    let plexamp = config.create_plexamp_client()?;
    let plex = config.create_plex_client()?;
    if config.get_verify_connections()? {
        verify_connections(&plexamp, &plex).await?;
    }

    let cache = Arc::new(config.create_thumbnail_cache(plex)?);
    let purge = PurgeGuard::new(cache.clone());

    let deck = StreamDeck::connect(params)
        .await
        .context("Cannot connect to Stream Deck")?;

    // ========== Sync ==========
    let registry = Arc::new(SurfaceRegistry::new());
    let sync = SyncLoop::new(
        plexamp,
        cache,
        registry.clone(),
        deck.handle(),
        Duration::from_millis(interval_ms),
    );

    let token = CancellationToken::new();
    let sync_task = tokio::spawn({
        let token = token.clone();
        async move { sync.run(token).await }
    });

    let handler = LifecycleHandler::new(registry);
    let result = tokio::select! {
        result = deck.run(&handler, token.clone()) => {
            info!("Stream Deck connection ended");
            result.map_err(anyhow::Error::from)
        }
        result = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            result.map_err(anyhow::Error::from)
        }
    };

    // ========== Shutdown ==========
    token.cancel();
    if let Err(e) = sync_task.await {
        warn!("Sync task ended abnormally: {}", e);
    }
    let removed = purge.purge().await;
    info!(removed, "PlexDeck stopped");

    result
}

async fn verify_connections(plexamp: &PlexampClient, plex: &PlexClient) -> Result<()> {
    plexamp
        .verify_connection()
        .await
        .with_context(|| format!("Plexamp is not reachable at {}", plexamp.base_url()))?;
    plex
        .verify_connection()
        .await
        .with_context(|| format!("Plex Media Server is not reachable at {}", plex.base_url()))?;
    info!(plexamp = plexamp.base_url(), plex = plex.base_url(), "Connections verified");
    Ok(())
}
