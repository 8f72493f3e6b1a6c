use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::metrics::DEFAULT_BUDGET_SECS;
use crate::passages::DEFAULT_PASSAGE_SET;

pub const DEFAULT_TICK_RATE_MS: u64 = 250;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// seconds allowed per test
    pub budget_secs: u64,
    /// how often the countdown is refreshed; kept at or below one second
    pub tick_rate_ms: u64,
    /// embedded passage set to draw reference texts from
    pub passages: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            budget_secs: DEFAULT_BUDGET_SECS,
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
            passages: DEFAULT_PASSAGE_SET.to_string(),
        }
    }
}

impl Config {
    pub fn tick_rate_ms(&self) -> u64 {
        self.tick_rate_ms.clamp(10, 1000)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("typesprint_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(err) => {
                    tracing::warn!(path = %self.path.display(), %err, "ignoring unreadable config")
                }
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
