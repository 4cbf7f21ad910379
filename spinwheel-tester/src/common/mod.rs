use anyhow::{Context, Result};
use chrono::Utc;
use spinwheel_game::{ConfigLoader, WheelConfig, WheelEngine};
use std::path::{Path, PathBuf};

/// Reads a wheel config document from disk.
pub struct FileConfigLoader {
    path: PathBuf,
}

impl FileConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigLoader for FileConfigLoader {
    type Error = std::io::Error;

    fn load_wheel_config(&self) -> Result<String, Self::Error> {
        std::fs::read_to_string(&self.path)
    }
}

/// Load `--config` if given, otherwise the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<WheelConfig> {
    let Some(path) = path else {
        return Ok(WheelConfig::default());
    };
    WheelEngine::new(FileConfigLoader::new(path))
        .load_config()
        .with_context(|| format!("failed to load wheel config from {}", path.display()))
}

pub fn report_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}
