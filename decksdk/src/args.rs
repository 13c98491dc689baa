//! Plugin launch arguments
//!
//! The Stream Deck application starts a plugin with four arguments:
//!
//! ```text
//! plugin -port 28196 -pluginUUID 5B0B... -registerEvent registerPlugin -info '{"application":...}'
//! ```
//!
//! The flags use a single dash, so they are rewritten as `--port`, ... before
//! being handed to clap.

use crate::error::{Error, Result};
use clap::Parser;
use serde::Deserialize;

const LAUNCH_FLAGS: [&str; 4] = ["-port", "-pluginUUID", "-registerEvent", "-info"];

#[derive(Parser, Debug)]
#[command(name = "plexdeck", version, about)]
struct LaunchArgs {
    /// Port of the Stream Deck WebSocket server
    #[arg(long = "port")]
    port: u16,

    /// Identifier of this plugin instance
    #[arg(long = "pluginUUID")]
    plugin_uuid: String,

    /// Event name to send when registering
    #[arg(long = "registerEvent")]
    register_event: String,

    /// JSON description of the application and devices
    #[arg(long = "info")]
    info: Option<String>,
}

/// What the plugin needs to register with the Stream Deck application
#[derive(Debug, Clone)]
pub struct RegistrationParams {
    pub port: u16,
    pub plugin_uuid: String,
    pub register_event: String,
    /// Raw `-info` JSON, as received
    pub raw_info: Option<String>,
}

impl RegistrationParams {
    /// Parses the process arguments
    pub fn from_env() -> Result<Self> {
        Self::from_args(std::env::args())
    }

    /// Parses an argument list whose first item is the program name
    pub fn from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let args = args.into_iter().map(|arg| normalize_flag(arg.into()));
        let parsed =
            LaunchArgs::try_parse_from(args).map_err(|e| Error::InvalidArguments(e.to_string()))?;

        Ok(Self {
            port: parsed.port,
            plugin_uuid: parsed.plugin_uuid,
            register_event: parsed.register_event,
            raw_info: parsed.info,
        })
    }

    /// WebSocket address of the Stream Deck application
    pub fn url(&self) -> String {
        format!("ws://127.0.0.1:{}", self.port)
    }

    /// Decodes the `-info` argument.
    ///
    /// Returns `Ok(None)` when the argument was not given.
    pub fn info(&self) -> Result<Option<RegistrationInfo>> {
        match &self.raw_info {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }
}

fn normalize_flag(arg: String) -> String {
    if LAUNCH_FLAGS.contains(&arg.as_str()) {
        format!("-{arg}")
    } else {
        arg
    }
}

/// Decoded `-info` argument
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationInfo {
    pub application: ApplicationInfo,
    pub plugin: PluginInfo,
    pub device_pixel_ratio: u32,
    pub devices: Vec<DeviceInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationInfo {
    pub language: String,
    pub platform: String,
    pub platform_version: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PluginInfo {
    pub uuid: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: i64,
    pub size: DeviceSize,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct DeviceSize {
    pub columns: u32,
    pub rows: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO: &str = r#"{"application":{"font":".AppleSystemUIFont","language":"en","platform":"mac","platformVersion":"14.5.0","version":"6.6.1"},"plugin":{"uuid":"dev.plexdeck","version":"1.0.0"},"devicePixelRatio":2,"colors":{},"devices":[{"id":"ABCD","name":"Stream Deck","size":{"columns":5,"rows":3},"type":0}]}"#;

    #[test]
    fn test_single_dash_flags() {
        let params = RegistrationParams::from_args([
            "plexdeck",
            "-port",
            "28196",
            "-pluginUUID",
            "5B0B2B0E",
            "-registerEvent",
            "registerPlugin",
            "-info",
            INFO,
        ])
        .unwrap();

        assert_eq!(params.port, 28196);
        assert_eq!(params.plugin_uuid, "5B0B2B0E");
        assert_eq!(params.register_event, "registerPlugin");
        assert_eq!(params.url(), "ws://127.0.0.1:28196");

        let info = params.info().unwrap().unwrap();
        assert_eq!(info.application.platform, "mac");
        assert_eq!(info.plugin.uuid, "dev.plexdeck");
        assert_eq!(info.device_pixel_ratio, 2);
        assert_eq!(info.devices.len(), 1);
        assert_eq!(info.devices[0].size.columns, 5);
    }

    #[test]
    fn test_double_dash_flags_still_work() {
        let params = RegistrationParams::from_args([
            "plexdeck",
            "--port",
            "1",
            "--pluginUUID",
            "u",
            "--registerEvent",
            "registerPlugin",
        ])
        .unwrap();
        assert_eq!(params.port, 1);
        assert!(params.info().unwrap().is_none());
    }

    #[test]
    fn test_missing_port() {
        let err = RegistrationParams::from_args([
            "plexdeck",
            "-pluginUUID",
            "u",
            "-registerEvent",
            "registerPlugin",
        ])
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)));
    }

    #[test]
    fn test_invalid_port() {
        assert!(
            RegistrationParams::from_args([
                "plexdeck",
                "-port",
                "not-a-port",
                "-pluginUUID",
                "u",
                "-registerEvent",
                "r",
            ])
            .is_err()
        );
    }

    #[test]
    fn test_invalid_info() {
        let params = RegistrationParams::from_args([
            "plexdeck",
            "-port",
            "1",
            "-pluginUUID",
            "u",
            "-registerEvent",
            "r",
            "-info",
            "{not json",
        ])
        .unwrap();
        assert!(matches!(params.info(), Err(Error::Json(_))));
    }
}
