use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a pipeline definition.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid pipeline definition: {0}")]
  Parse(#[from] serde_json::Error),
}
