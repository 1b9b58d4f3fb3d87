//! Runtime configuration, read from a TOML file with every field optional.
//!
//! Lookup: explicit path, then `SUBSTATION_DASH_CONFIG`, then defaults.

use crate::map::MapSettings;
use serde::Deserialize;
use std::{
    env, fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub const CONFIG_ENV_VAR: &str = "SUBSTATION_DASH_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub output_dir: PathBuf,
    /// Shown on the "Data Updated" card.
    pub data_updated: String,
    pub page_size: usize,
    pub preview_rows: usize,
    pub map: MapSettings,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("maindataset.csv"),
            output_dir: PathBuf::from("."),
            data_updated: "Q2 2023".to_string(),
            page_size: 10,
            preview_rows: 5,
            map: MapSettings::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl DashboardConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Never fails: a bad file is logged and defaults are used.
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));
        let Some(path) = path else {
            tracing::info!(target: "substation_dash::config", "config.loaded=builtin");
            return Self::default();
        };
        match Self::from_file(&path) {
            Ok(cfg) => {
                tracing::info!(
                    target: "substation_dash::config",
                    path = %path.display(),
                    "config.loaded=file"
                );
                cfg
            }
            Err(err) => {
                tracing::warn!(
                    target: "substation_dash::config",
                    path = %path.display(),
                    error = %err,
                    "config.load_failed"
                );
                Self::default()
            }
        }
    }
}
