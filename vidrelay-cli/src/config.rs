use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use vidrelay::{RelayConfig, YtDlpSource};

/// On-disk configuration.
///
/// ```toml
/// [relay]
/// deadline_ms = 10000
/// definition_url = "https://example.com/instances.json"
///
/// [relay.pool]
/// video = ["https://inv.example.com"]
/// search = ["https://inv.example.com"]
/// channel = []
/// comments = []
/// playlist = []
///
/// [ytdlp]
/// binary = "/usr/local/bin/yt-dlp"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub relay: RelayConfig,
    pub ytdlp: YtDlpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct YtDlpConfig {
    pub binary: PathBuf,
    pub timeout_secs: u64,
}

impl Default for YtDlpConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("yt-dlp"),
            timeout_secs: 30,
        }
    }
}

impl YtDlpConfig {
    pub fn source(&self) -> YtDlpSource {
        YtDlpSource::new(&self.binary, Duration::from_secs(self.timeout_secs))
    }
}

impl AppConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vidrelay").join("config.toml"))
    }

    /// Loads `path`, or the default location when `None`. A missing default
    /// file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            if explicit {
                anyhow::bail!("config file {} does not exist", path.display());
            }
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.relay.validate()?;
        Ok(config)
    }
}
