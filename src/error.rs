//! Error types for the scanning front end.
//!
//! The resolution core never fails; anomalies there become diagnostics.
//! These errors cover file access, parsing and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported language for {0}")]
    UnsupportedLanguage(PathBuf),

    #[error("failed to load grammar: {0}")]
    Grammar(String),

    #[error("parser produced no syntax tree for {0}")]
    Parse(PathBuf),

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("no source roots given")]
    NoSourceRoots,
}

impl ScanError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Io {
            path: path.into(),
            source,
        }
    }
}
