//! Configuration - JSON File With Defaults

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::tree::DEFAULT_IGNORE;

pub const DEFAULT_CANVAS_SIZE: u32 = 256;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Canvas size must be positive")]
    InvalidCanvasSize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    #[serde(default = "default_canvas_size")]
    pub canvas_size: u32,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_covers_dir")]
    pub covers_dir: PathBuf,
    /// Fixed seed for reproducible output; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
}

fn default_canvas_size() -> u32 { DEFAULT_CANVAS_SIZE }
fn default_output_dir() -> PathBuf { PathBuf::from("avatars") }
fn default_covers_dir() -> PathBuf { PathBuf::from("covers") }
fn default_ignore() -> Vec<String> {
    DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            canvas_size: default_canvas_size(),
            output_dir: default_output_dir(),
            covers_dir: default_covers_dir(),
            seed: None,
            ignore: default_ignore(),
        }
    }
}

impl GeneratorConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_owned(),
                source,
            },
            other => other,
        })
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas_size == 0 {
            return Err(ConfigError::InvalidCanvasSize);
        }
        Ok(())
    }
}
