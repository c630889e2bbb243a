//! Stage results.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Classification of a not-completed result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FailureKind {
  /// The input could not be processed, e.g. it had the wrong shape.
  Error,
  /// The input was valid but did not satisfy the app's conditions.
  Fail,
  /// The app hit a condition its authors consider a bug.
  Bug,
}

impl fmt::Display for FailureKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FailureKind::Error => f.write_str("ERROR"),
      FailureKind::Fail => f.write_str("FAIL"),
      FailureKind::Bug => f.write_str("BUG"),
    }
  }
}

/// A recoverable failure carried as data through the rest of a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotCompleted {
  pub kind: FailureKind,
  /// Name of the app that produced the marker. Filled in by the app
  /// instance when the stage leaves it empty.
  #[serde(default)]
  pub origin: String,
  pub message: String,
  /// Identifier of the input that failed, when known.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source: Option<String>,
}

impl NotCompleted {
  pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
    Self {
      kind,
      origin: String::new(),
      message: message.into(),
      source: None,
    }
  }

  pub fn fail(message: impl Into<String>) -> Self {
    Self::new(FailureKind::Fail, message)
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self::new(FailureKind::Error, message)
  }

  pub fn with_source(mut self, source: impl Into<String>) -> Self {
    self.source = Some(source.into());
    self
  }
}

impl fmt::Display for NotCompleted {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} in '{}': {}", self.kind, self.origin, self.message)?;
    if let Some(source) = &self.source {
      write!(f, " (source: {})", source)?;
    }
    Ok(())
  }
}

/// Result of invoking a single stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Outcome {
  Completed(Value),
  NotCompleted(NotCompleted),
}

impl Outcome {
  pub fn is_completed(&self) -> bool {
    matches!(self, Outcome::Completed(_))
  }

  pub fn value(&self) -> Option<&Value> {
    match self {
      Outcome::Completed(v) => Some(v),
      Outcome::NotCompleted(_) => None,
    }
  }

  pub fn not_completed(&self) -> Option<&NotCompleted> {
    match self {
      Outcome::Completed(_) => None,
      Outcome::NotCompleted(nc) => Some(nc),
    }
  }

  pub fn into_value(self) -> Result<Value, NotCompleted> {
    match self {
      Outcome::Completed(v) => Ok(v),
      Outcome::NotCompleted(nc) => Err(nc),
    }
  }
}

impl From<Value> for Outcome {
  fn from(value: Value) -> Self {
    Outcome::Completed(value)
  }
}

impl From<NotCompleted> for Outcome {
  fn from(nc: NotCompleted) -> Self {
    Outcome::NotCompleted(nc)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_display_includes_origin_and_source() {
    let mut nc = NotCompleted::fail("sequence too short").with_source("brca1.fasta");
    nc.origin = "min_length".to_string();
    assert_eq!(
      nc.to_string(),
      "FAIL in 'min_length': sequence too short (source: brca1.fasta)"
    );
  }

  #[test]
  fn test_outcome_serialises_with_status() {
    let outcome = Outcome::NotCompleted(NotCompleted::error("bad input"));
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "not_completed");
    assert_eq!(json["data"]["kind"], "ERROR");

    let done = serde_json::to_value(Outcome::Completed(serde_json::json!(3))).unwrap();
    assert_eq!(done, serde_json::json!({"status": "completed", "data": 3}));
  }
}
