use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// A pipeline: an ordered list of app steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDef {
  pub name: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub description: String,
  pub steps: Vec<StepDef>,
}

/// One app in a pipeline, with its construction arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDef {
  /// App name, short or namespace-qualified, e.g. `"sample.min_length"`.
  pub app: String,
  /// Positional construction arguments.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub args: Vec<Value>,
  /// Keyword construction arguments.
  #[serde(default, skip_serializing_if = "Map::is_empty")]
  pub kwargs: Map<String, Value>,
}

impl StepDef {
  pub fn new(app: impl Into<String>) -> Self {
    Self {
      app: app.into(),
      args: Vec::new(),
      kwargs: Map::new(),
    }
  }

  pub fn arg(mut self, value: impl Into<Value>) -> Self {
    self.args.push(value.into());
    self
  }

  pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.kwargs.insert(key.into(), value.into());
    self
  }
}

impl PipelineDef {
  pub fn from_json(json: &str) -> Result<Self, ConfigError> {
    Ok(serde_json::from_str(json)?)
  }

  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&content)
  }
}
