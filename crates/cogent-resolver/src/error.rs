use cogent_app::ComposeError;
use cogent_registry::RegistryError;
use thiserror::Error;

/// Errors that can occur during pipeline resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// The pipeline has no steps.
  #[error("pipeline '{name}' has no steps")]
  EmptyPipeline { name: String },

  /// A step's app could not be found or constructed.
  #[error("step {index} ('{app}'): {source}")]
  Lookup {
    index: usize,
    app: String,
    #[source]
    source: RegistryError,
  },

  /// A step could not be composed with the previous one.
  #[error("step {index} ('{app}'): {source}")]
  Compose {
    index: usize,
    app: String,
    #[source]
    source: ComposeError,
  },
}
