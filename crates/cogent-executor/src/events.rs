//! Execution events and notifiers for observability.
//!
//! Events are emitted while a chain runs so callers can log progress, record
//! per-stage results or stream them elsewhere.

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Events emitted during pipeline execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionEvent {
  /// A run has started.
  RunStarted { run_id: String, stages: Vec<String> },

  /// A stage is about to be invoked.
  StageStarted { run_id: String, stage: String },

  /// A stage produced a value.
  StageCompleted { run_id: String, stage: String },

  /// A stage returned a not-completed marker.
  StageNotCompleted {
    run_id: String,
    stage: String,
    reason: String,
  },

  /// A stage was not invoked because an earlier stage did not complete.
  StageSkipped { run_id: String, stage: String },

  /// A stage faulted; the run stops.
  StageFaulted {
    run_id: String,
    stage: String,
    error: String,
  },

  /// The run finished without a fault. `completed` is false when the final
  /// outcome is a not-completed marker.
  RunFinished { run_id: String, completed: bool },

  /// The run stopped on a fault.
  RunFailed { run_id: String, error: String },
}

/// Trait for receiving execution events.
///
/// The executor calls `notify` for each event; implementations decide what
/// to do with them.
pub trait ExecutionNotifier: Send + Sync {
  fn notify(&self, event: ExecutionEvent);
}

/// A no-op notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {}
}

/// Logs run-level events at `info` and failures at `warn`.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl ExecutionNotifier for TracingNotifier {
  fn notify(&self, event: ExecutionEvent) {
    match event {
      ExecutionEvent::RunStarted { run_id, stages } => {
        info!(%run_id, stages = %stages.join(" + "), "run started");
      }
      ExecutionEvent::StageNotCompleted {
        run_id,
        stage,
        reason,
      } => {
        warn!(%run_id, %stage, %reason, "stage not completed");
      }
      ExecutionEvent::StageFaulted {
        run_id,
        stage,
        error,
      } => {
        warn!(%run_id, %stage, %error, "stage faulted");
      }
      ExecutionEvent::RunFinished { run_id, completed } => {
        info!(%run_id, completed, "run finished");
      }
      _ => {}
    }
  }
}

/// Sends events to a channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: Sender<ExecutionEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: Sender<ExecutionEvent>) -> Self {
    Self { sender }
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // Ignore send errors - receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
