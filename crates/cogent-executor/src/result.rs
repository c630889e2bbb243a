//! Execution result types.

use cogent_app::{NotCompleted, Outcome};
use serde::{Deserialize, Serialize};

/// What happened to one stage during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
  Completed,
  NotCompleted,
  /// Not invoked because the input was already not completed.
  Skipped,
}

/// Per-stage record of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
  pub stage: String,
  pub status: StageStatus,
}

/// Result of running a chain over one input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
  /// Unique run ID.
  pub run_id: String,
  /// Output of the last stage, or the first not-completed marker.
  pub outcome: Outcome,
  /// One record per stage, in chain order.
  pub stages: Vec<StageRecord>,
}

impl RunResult {
  pub fn is_completed(&self) -> bool {
    self.outcome.is_completed()
  }

  pub fn not_completed(&self) -> Option<&NotCompleted> {
    self.outcome.not_completed()
  }

  /// Names of the stages that were actually invoked.
  pub fn invoked(&self) -> Vec<&str> {
    self
      .stages
      .iter()
      .filter(|r| r.status != StageStatus::Skipped)
      .map(|r| r.stage.as_str())
      .collect()
  }
}
