//! Editor configuration.
//!
//! Loaded from a YAML file; every field is optional and falls back to its default.
//!
//! ```yaml
//! undo_debounce_ms: 500
//! new_file_encoding: utf-16
//! ```

use crate::debounce::DEFAULT_DEBOUNCE;
use crate::document::DocumentOptions;
use crate::encoding::{EncodingError, TextEncoding};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors produced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The YAML is malformed or has wrongly typed fields.
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// `new_file_encoding` is not a known encoding label.
    #[error("invalid new_file_encoding: {0}")]
    Encoding(#[from] EncodingError),
}

/// User preferences for the editor engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Quiet period (milliseconds) before typed text becomes an undo step.
    pub undo_debounce_ms: u64,
    /// Encoding label used when saving to a file that does not exist yet.
    pub new_file_encoding: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            new_file_encoding: "utf-16".to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&yaml)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Serialize to YAML.
    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// The undo debounce window.
    pub fn undo_debounce(&self) -> Duration {
        Duration::from_millis(self.undo_debounce_ms)
    }

    /// Resolve the options every new document is created with.
    pub fn document_options(&self) -> Result<DocumentOptions, ConfigError> {
        Ok(DocumentOptions {
            undo_debounce: self.undo_debounce(),
            new_file_encoding: TextEncoding::for_label(&self.new_file_encoding)?,
        })
    }
}
