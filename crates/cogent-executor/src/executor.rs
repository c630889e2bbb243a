//! Pipeline executor.
//!
//! The `PipelineExecutor` drives an input through a chain one stage at a
//! time. A not-completed result stops further stages from being invoked and
//! is returned as the run's outcome; a stage error stops the run and is
//! returned to the caller as is.

use cogent_app::{AppError, Chain, Outcome};
use tracing::{debug, debug_span};

use crate::events::{ExecutionEvent, ExecutionNotifier, NoopNotifier};
use crate::result::{RunResult, StageRecord, StageStatus};

/// Runs composed chains.
///
/// Generic over `N: ExecutionNotifier` to allow different notification
/// strategies. Use `PipelineExecutor::new()` for an executor with no-op
/// notifications, or `PipelineExecutor::with_notifier()` to observe runs.
#[derive(Debug, Clone, Default)]
pub struct PipelineExecutor<N: ExecutionNotifier = NoopNotifier> {
  notifier: N,
}

impl PipelineExecutor<NoopNotifier> {
  pub fn new() -> Self {
    Self::with_notifier(NoopNotifier)
  }
}

impl<N: ExecutionNotifier> PipelineExecutor<N> {
  pub fn with_notifier(notifier: N) -> Self {
    Self { notifier }
  }

  pub fn notifier(&self) -> &N {
    &self.notifier
  }

  /// Run `chain` over `input`.
  ///
  /// `input` may itself be a not-completed marker, in which case no stage is
  /// invoked. A chain whose stages have been disconnected or re-composed
  /// since it was built is rejected before anything runs.
  pub fn run(&self, chain: &Chain, input: impl Into<Outcome>) -> Result<RunResult, AppError> {
    chain.verify()?;

    let run_id = uuid::Uuid::new_v4().to_string();
    let _span = debug_span!("run", %run_id).entered();

    self.notifier.notify(ExecutionEvent::RunStarted {
      run_id: run_id.clone(),
      stages: chain.names().iter().map(|s| s.to_string()).collect(),
    });

    let mut current = input.into();
    let mut stages = Vec::with_capacity(chain.len());

    for app in chain.iter() {
      let stage = app.name().to_string();

      let value = match current {
        Outcome::Completed(value) => value,
        not_completed => {
          debug!(%stage, "skipping stage");
          self.notifier.notify(ExecutionEvent::StageSkipped {
            run_id: run_id.clone(),
            stage: stage.clone(),
          });
          stages.push(StageRecord {
            stage,
            status: StageStatus::Skipped,
          });
          current = not_completed;
          continue;
        }
      };

      self.notifier.notify(ExecutionEvent::StageStarted {
        run_id: run_id.clone(),
        stage: stage.clone(),
      });

      current = match app.call(value) {
        Ok(outcome) => outcome,
        Err(e) => {
          self.notifier.notify(ExecutionEvent::StageFaulted {
            run_id: run_id.clone(),
            stage,
            error: e.to_string(),
          });
          self.notifier.notify(ExecutionEvent::RunFailed {
            run_id,
            error: e.to_string(),
          });
          return Err(e);
        }
      };

      let status = match &current {
        Outcome::Completed(_) => {
          self.notifier.notify(ExecutionEvent::StageCompleted {
            run_id: run_id.clone(),
            stage: stage.clone(),
          });
          StageStatus::Completed
        }
        Outcome::NotCompleted(nc) => {
          self.notifier.notify(ExecutionEvent::StageNotCompleted {
            run_id: run_id.clone(),
            stage: stage.clone(),
            reason: nc.to_string(),
          });
          StageStatus::NotCompleted
        }
      };
      stages.push(StageRecord { stage, status });
    }

    self.notifier.notify(ExecutionEvent::RunFinished {
      run_id: run_id.clone(),
      completed: current.is_completed(),
    });

    Ok(RunResult {
      run_id,
      outcome: current,
      stages,
    })
  }

  /// Run `chain` over each input in turn. A fault on one input does not stop
  /// the others.
  pub fn run_all<I>(&self, chain: &Chain, inputs: I) -> Vec<Result<RunResult, AppError>>
  where
    I: IntoIterator,
    I::Item: Into<Outcome>,
  {
    inputs
      .into_iter()
      .map(|input| self.run(chain, input))
      .collect()
  }
}
