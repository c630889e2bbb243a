use thiserror::Error;

/// Errors raised by apps, either while they are declared and constructed or
/// while a stage executes.
///
/// An `AppError` returned from a running stage is a fault: it halts the
/// pipeline. Recoverable per-input failures are reported as
/// [`NotCompleted`](crate::NotCompleted) outcomes instead.
#[derive(Debug, Error)]
pub enum AppError {
  /// The app declaration itself is malformed.
  #[error("invalid declaration for app '{app}': {message}")]
  InvalidDeclaration { app: String, message: String },

  /// Construction arguments do not match the parameter schema.
  #[error("invalid arguments for app '{app}': {message}")]
  InvalidArgument { app: String, message: String },

  /// The stage failed outside its normal result contract.
  #[error("app '{app}' failed: {message}")]
  Fault { app: String, message: String },

  /// IO error raised by a stage.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// The chain being run is no longer linked end to end.
  #[error("chain is broken: {0}")]
  Chain(#[from] crate::compose::ComposeError),

  /// JSON (de)serialisation error raised by a stage.
  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

impl AppError {
  pub fn fault(app: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Fault {
      app: app.into(),
      message: message.into(),
    }
  }

  pub fn invalid_argument(app: impl Into<String>, message: impl Into<String>) -> Self {
    Self::InvalidArgument {
      app: app.into(),
      message: message.into(),
    }
  }
}
