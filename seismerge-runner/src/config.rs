//! Pipeline configuration.
//!
//! Loaded from a TOML file; every field has a production default so a bare
//! `seismerge run` works against the collector's drop directory. The
//! destination connection string resolves environment-first (`DATABASE_URL`)
//! and its absence is fatal before any file I/O starts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("no destination database configured — set DATABASE_URL or [pipeline] database_url")]
    MissingDatabaseUrl,
}

/// Top-level configuration for one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub pipeline: PipelineSection,

    /// Instrument id → filename relative to `data_dir`. The id names the
    /// output column (`<id>_Close`), so it must stay a plain identifier.
    #[serde(default = "default_instruments")]
    pub instruments: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSection {
    /// Directory the collector drops input files into.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Filename prefix of event exports (the collector names them by
    /// timestamp, so `202` matches everything this decade).
    #[serde(default = "default_event_prefix")]
    pub event_file_prefix: String,

    /// Destination table, fully replaced each run.
    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// Destination database. `DATABASE_URL` in the environment overrides.
    #[serde(default)]
    pub database_url: Option<String>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_event_prefix() -> String {
    "202".to_string()
}

fn default_table_name() -> String {
    "processed_training_data".to_string()
}

fn default_instruments() -> BTreeMap<String, String> {
    ["TSM", "AAPL", "NVDA", "AMD", "QCOM"]
        .into_iter()
        .map(|t| (t.to_string(), format!("{t}_weekly_data.csv")))
        .collect()
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            event_file_prefix: default_event_prefix(),
            table_name: default_table_name(),
            database_url: None,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineSection::default(),
            instruments: default_instruments(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Resolve the destination connection string: environment first, then
    /// the config file.
    pub fn resolve_database_url(&self) -> Result<String, ConfigError> {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                return Ok(url);
            }
        }
        self.pipeline
            .database_url
            .clone()
            .ok_or(ConfigError::MissingDatabaseUrl)
    }
}
