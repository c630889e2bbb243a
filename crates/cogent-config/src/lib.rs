//! Cogent Config
//!
//! This crate contains the serializable pipeline configuration types for
//! cogent. These types describe a pipeline before its apps are looked up in a
//! registry and composed.
//!
//! Configuration is loaded from JSON files, e.g.
//!
//! ```json
//! {
//!   "name": "brca1-tree",
//!   "steps": [
//!     { "app": "load_fasta" },
//!     { "app": "sample.min_length", "args": [300] },
//!     { "app": "pad_gaps" },
//!     { "app": "hamming" },
//!     { "app": "quick_tree" },
//!     { "app": "write_json", "kwargs": { "dir": "out", "stem": "tree" } }
//!   ]
//! }
//! ```

mod error;
mod pipeline;

pub use error::ConfigError;
pub use pipeline::{PipelineDef, StepDef};
