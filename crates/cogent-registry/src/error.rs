use cogent_app::AppError;
use thiserror::Error;

/// Errors that can occur when working with the app registry.
#[derive(Debug, Error)]
pub enum RegistryError {
  /// No registered app matches the requested name.
  #[error("no app named '{name}'")]
  NotFound { name: String },

  /// The name matches several apps; qualify it with a namespace.
  #[error("app name '{name}' is ambiguous, use one of: {}", candidates.join(", "))]
  Ambiguous {
    name: String,
    candidates: Vec<String>,
  },

  /// An app with the same qualified name is already registered.
  #[error("app already registered: {name}")]
  AlreadyRegistered { name: String },

  /// The app was found but could not be constructed from the arguments.
  #[error("failed to construct app '{name}': {source}")]
  Construction {
    name: String,
    #[source]
    source: AppError,
  },

  /// A plugin failed to declare its apps.
  #[error("plugin '{plugin}' failed: {source}")]
  Plugin {
    plugin: String,
    #[source]
    source: AppError,
  },
}

impl RegistryError {
  /// Whether the error comes from name resolution rather than construction.
  pub fn is_resolution_error(&self) -> bool {
    matches!(
      self,
      RegistryError::NotFound { .. } | RegistryError::Ambiguous { .. }
    )
  }
}
