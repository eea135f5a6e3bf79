use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Job defaults read from the CLI config file; command-line flags override
/// whatever is set here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobDefaults {
    pub partitions: Option<usize>,
    pub combine: Option<bool>,
    pub track_state: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    defaults: JobDefaults,
    profiles: HashMap<String, JobDefaults>,
    default_profile: Option<String>,
}

#[derive(Debug, Default)]
pub struct CliConfig {
    data: RawConfig,
}

impl CliConfig {
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = explicit.or_else(default_config_path);
        let data = match path {
            Some(config_path) if config_path.exists() => read_file(&config_path)?,
            _ => RawConfig::default(),
        };
        Ok(Self { data })
    }

    /// Resolves effective defaults: the `[defaults]` section overlaid with
    /// the requested profile (or the configured default profile).
    pub fn defaults(&self, profile: Option<&str>) -> Result<JobDefaults, ConfigError> {
        let name = profile
            .map(str::to_string)
            .or_else(|| self.data.default_profile.clone());
        let mut merged = self.data.defaults.clone();
        if let Some(name) = name {
            let overlay = self
                .data
                .profiles
                .get(&name)
                .ok_or(ConfigError::ProfileNotFound { name })?;
            if overlay.partitions.is_some() {
                merged.partitions = overlay.partitions;
            }
            if overlay.combine.is_some() {
                merged.combine = overlay.combine;
            }
            if overlay.track_state.is_some() {
                merged.track_state = overlay.track_state;
            }
        }
        Ok(merged)
    }
}

fn read_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("poda").join("cli.toml"))
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read CLI config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse CLI config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },
}
