//! Application configuration: `graphlens.toml`, `.env` and environment overrides

use std::path::{Path, PathBuf};

use anyhow::Context;
use graphlens_loaders::JsonLoaderConfig;
use graphlens_server::RenderSettings;
use serde::{Deserialize, Serialize};

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "graphlens.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Files loaded through `POST /api/workspaces` must live under this directory.
    pub data_dir: PathBuf,
}

impl Default for ServerSection {
    fn default() -> Self {
        ServerSection {
            host: "127.0.0.1".to_string(),
            port: 7890,
            data_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSection {
    pub width: u32,
    pub height: u32,
    /// Renderer used when a request names none.
    pub visualizer: String,
}

impl Default for RenderSection {
    fn default() -> Self {
        let size = RenderSettings::default();
        RenderSection {
            width: size.width,
            height: size.height,
            visualizer: graphlens_core::DEFAULT_RENDERER.to_string(),
        }
    }
}

impl RenderSection {
    pub fn settings(&self) -> RenderSettings {
        RenderSettings {
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub render: RenderSection,
    /// JSON loaders to register; the built-in presets when empty.
    pub datasets: Vec<JsonLoaderConfig>,
}

impl AppConfig {
    /// Read `path`. A missing file is only an error when it was asked for explicitly.
    pub fn load(path: &Path, explicit: bool) -> anyhow::Result<Self> {
        if !path.exists() && !explicit {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(AppConfig::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `GRAPHLENS_HOST` and `GRAPHLENS_PORT` from the environment.
    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        self.apply_overrides(
            std::env::var("GRAPHLENS_HOST").ok(),
            std::env::var("GRAPHLENS_PORT").ok(),
        )
    }

    fn apply_overrides(&mut self, host: Option<String>, port: Option<String>) -> anyhow::Result<()> {
        if let Some(host) = host.filter(|h| !h.trim().is_empty()) {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("GRAPHLENS_PORT is not a port number: '{port}'"))?;
        }
        Ok(())
    }

    pub fn datasets(&self) -> Vec<JsonLoaderConfig> {
        if self.datasets.is_empty() {
            graphlens_loaders::builtin_presets()
        } else {
            self.datasets.clone()
        }
    }
}
