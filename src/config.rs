use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub typing: TypingConfig,
    pub scroll: ScrollConfig,
    pub ui: UiConfig,
}

/// Per-character delay bounds, in milliseconds. The upper bound is exclusive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TypingConfig {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 20,
            max_delay_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScrollConfig {
    pub smooth: bool,
    pub duration_ms: u64,
    /// Columns kept free to the right of the typing position.
    pub margin: u16,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            smooth: true,
            duration_ms: 150,
            margin: 4,
        }
    }
}

impl ScrollConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn is_smooth(&self) -> bool {
        self.smooth && self.duration_ms > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub frame_rate_ms: u64,
    pub file_name: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            frame_rate_ms: 16,
            file_name: "script.js".to_string(),
        }
    }
}

impl Config {
    /// Loads the config at `path`, or the default location when `path` is
    /// `None`. A missing default file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.typing.min_delay_ms >= self.typing.max_delay_ms {
            return Err(Error::Config(format!(
                "typing.min_delay_ms ({}) must be below typing.max_delay_ms ({})",
                self.typing.min_delay_ms, self.typing.max_delay_ms
            )));
        }

        if self.ui.frame_rate_ms == 0 {
            return Err(Error::Config("ui.frame_rate_ms must be positive".into()));
        }

        Ok(())
    }

    /// ~/.config/typewriter/config.toml
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("typewriter")
            .join("config.toml")
    }

    pub fn frame_rate(&self) -> Duration {
        Duration::from_millis(self.ui.frame_rate_ms)
    }
}
