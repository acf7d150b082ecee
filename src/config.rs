use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::controller::SubmitMode;
use crate::error::{AppError, Result};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:10124";

/// Settings read from `config.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root URL of the analysis service.
    pub endpoint: String,
    /// How the target URL is sent.
    pub submit: SubmitMode,
    /// Colored output.
    pub color: bool,
    /// Whole-request timeout. Unset leaves it to the transport.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            submit: SubmitMode::default(),
            color: true,
            timeout_secs: None,
        }
    }
}

impl Config {
    /// `<config_dir>/craap/config.toml`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("craap").join("config.toml"))
    }

    /// Load from `path` (or the default location). A missing file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            return Ok(Self::default());
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)?;
        Self::parse(&contents, &path)
    }

    pub fn parse(contents: &str, path: &Path) -> Result<Self> {
        toml::from_str(contents).map_err(|e| AppError::Config {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| AppError::Config {
            path: Self::default_path().unwrap_or_default(),
            message: e.to_string(),
        })
    }
}
