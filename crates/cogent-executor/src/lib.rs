//! Cogent Executor
//!
//! Runs composed app chains over inputs.
//!
//! ```text
//! input ──▶ stage 1 ──▶ stage 2 ──▶ ... ──▶ stage n ──▶ RunResult
//!                 │
//!                 └─ NotCompleted: remaining stages skipped, marker returned
//!                 └─ AppError: run stops, error returned
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use cogent_executor::{PipelineExecutor, TracingNotifier};
//!
//! let chain = resolver.resolve(pipeline_def)?;
//! let executor = PipelineExecutor::with_notifier(TracingNotifier);
//! let result = executor.run(&chain, serde_json::json!("seqs.fasta"))?;
//! ```

mod events;
mod executor;
mod result;

pub use events::{ChannelNotifier, ExecutionEvent, ExecutionNotifier, NoopNotifier, TracingNotifier};
pub use executor::PipelineExecutor;
pub use result::{RunResult, StageRecord, StageStatus};
