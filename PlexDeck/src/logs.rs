//! Logging setup
//!
//! Stream Deck discards the plugin's stdout, so logs go to a JSON file in the
//! working directory (the plugin bundle). The file is truncated at every
//! start. A console layer can be enabled for development runs.

use anyhow::{Context, Result};
use deckconfig::Config;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::{
    Registry, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// What [`init_logging`] installed
#[derive(Debug, Clone)]
pub struct LogState {
    log_file: PathBuf,
    max_level: Level,
}

impl LogState {
    pub fn max_level(&self) -> Level {
        self.max_level
    }

    /// Path of the log file
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }
}

/// Installs the global subscriber described by the `log` section of `config`
pub fn init_logging(config: &Config) -> Result<LogState> {
    let level = configured_level(config);

    let log_file = config.resolve_path(&config.get_log_file()?);
    let file = open_log_file(&log_file)?;

    let console = config.get_log_enable_console().unwrap_or(false).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
    });

    Registry::default()
        .with(level_to_levelfilter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        )
        .with(console)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    Ok(LogState {
        log_file,
        max_level: level,
    })
}

/// `log.min_level`, INFO when missing or unknown
fn configured_level(config: &Config) -> Level {
    config
        .get_log_min_level()
        .ok()
        .and_then(|l| string_to_level(&l))
        .unwrap_or(Level::INFO)
}

/// Creates or truncates the log file
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("Cannot open log file {}", path.display()))
}

fn string_to_level(s: &str) -> Option<Level> {
    match s.trim().to_uppercase().as_str() {
        "ERROR" => Some(Level::ERROR),
        "WARN" | "WARNING" => Some(Level::WARN),
        "INFO" => Some(Level::INFO),
        "DEBUG" => Some(Level::DEBUG),
        "TRACE" => Some(Level::TRACE),
        _ => None,
    }
}

fn level_to_levelfilter(level: Level) -> LevelFilter {
    match level {
        Level::ERROR => LevelFilter::ERROR,
        Level::WARN => LevelFilter::WARN,
        Level::INFO => LevelFilter::INFO,
        Level::DEBUG => LevelFilter::DEBUG,
        Level::TRACE => LevelFilter::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_to_level() {
        assert_eq!(string_to_level("info"), Some(Level::INFO));
        assert_eq!(string_to_level(" Debug "), Some(Level::DEBUG));
        assert_eq!(string_to_level("warning"), Some(Level::WARN));
        assert_eq!(string_to_level("loud"), None);
    }

    #[test]
    fn test_level_to_levelfilter() {
        assert_eq!(level_to_levelfilter(Level::TRACE), LevelFilter::TRACE);
        assert_eq!(level_to_levelfilter(Level::ERROR), LevelFilter::ERROR);
    }

    #[test]
    fn test_configured_level() {
        let dir = tempfile::tempdir().unwrap();
        let load = |level: &str| {
            let vars = [("PLEXDECK_CONFIG__LOG__MIN_LEVEL".to_string(), level.to_string())];
            Config::load_config_with_env(dir.path().to_str().unwrap(), vars).unwrap()
        };

        assert_eq!(configured_level(&load("debug")), Level::DEBUG);
        assert_eq!(configured_level(&load("chatty")), Level::INFO);
    }

    #[test]
    fn test_log_file_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("stdout.log");

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"previous run").unwrap();

        open_log_file(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap().len(), 0);
    }
}
