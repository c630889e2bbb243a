//! Composition of app instances into chains.
//!
//! Composition only ever validates the adjacent pair being linked. Links are
//! weak; a [`Chain`] owns the handles of its stages.

use std::sync::Weak;

use thiserror::Error;
use tracing::debug;

use crate::descriptor::Role;
use crate::instance::App;
use crate::types::TypeSet;

/// Why two apps cannot exchange data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incompatibility {
  /// The upstream app is a writer.
  WriterFeedsForward,
  /// The downstream app is a loader.
  LoaderReceivesInput,
  /// No produced type is accepted downstream and none is a wildcard.
  DisjointTypes { produced: TypeSet, accepted: TypeSet },
}

impl std::fmt::Display for Incompatibility {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Incompatibility::WriterFeedsForward => f.write_str("a writer cannot feed another app"),
      Incompatibility::LoaderReceivesInput => f.write_str("a loader cannot receive input"),
      Incompatibility::DisjointTypes { produced, accepted } => write!(
        f,
        "produces [{}] but downstream accepts [{}]",
        produced, accepted
      ),
    }
  }
}

/// Errors raised when composing two apps.
#[derive(Debug, Error)]
pub enum ComposeError {
  /// An app was composed with itself.
  #[error("cannot compose app '{name}' with itself")]
  SelfComposition { name: String },

  /// One side is already linked on the side being composed.
  #[error("app '{name}' is already part of a composition, disconnect it first")]
  AlreadyComposed { name: String },

  /// The pair has no valid data contract.
  #[error("cannot compose '{upstream}' with '{downstream}': {reason}")]
  Incompatible {
    upstream: String,
    downstream: String,
    reason: Incompatibility,
  },

  /// Linking would make the chain loop back on itself.
  #[error("composing '{upstream}' with '{downstream}' would create a cycle")]
  Cycle { upstream: String, downstream: String },

  /// Two adjacent stages of a chain are no longer linked to each other.
  #[error("'{upstream}' is no longer composed with '{downstream}'")]
  Unlinked { upstream: String, downstream: String },
}

impl ComposeError {
  /// Whether this is a data-contract violation (role or types).
  pub fn is_type_error(&self) -> bool {
    matches!(self, ComposeError::Incompatible { .. })
  }

  /// Whether this is a misuse of instances (self-composition, reuse without
  /// disconnecting, cycles).
  pub fn is_value_error(&self) -> bool {
    !self.is_type_error()
  }
}

/// Check whether `a` may feed `b`, ignoring instance identity and links.
pub fn check_compatible(a: &App, b: &App) -> Result<(), Incompatibility> {
  if a.role() == Role::Writer {
    return Err(Incompatibility::WriterFeedsForward);
  }
  if b.role() == Role::Loader {
    return Err(Incompatibility::LoaderReceivesInput);
  }
  if !a.return_types().feeds(b.data_types()) {
    return Err(Incompatibility::DisjointTypes {
      produced: a.return_types().clone(),
      accepted: b.data_types().clone(),
    });
  }
  Ok(())
}

/// Link `a`'s output to `b`'s input and return the resulting chain.
pub fn compose(a: &App, b: &App) -> Result<Chain, ComposeError> {
  if a.same_instance(b) {
    return Err(ComposeError::SelfComposition {
      name: a.name().to_string(),
    });
  }
  if a.downstream().is_some() {
    return Err(ComposeError::AlreadyComposed {
      name: a.name().to_string(),
    });
  }
  if b.upstream().is_some() {
    return Err(ComposeError::AlreadyComposed {
      name: b.name().to_string(),
    });
  }

  check_compatible(a, b).map_err(|reason| ComposeError::Incompatible {
    upstream: a.name().to_string(),
    downstream: b.name().to_string(),
    reason,
  })?;

  if walk(a, App::upstream).any(|up| up.same_instance(b)) {
    return Err(ComposeError::Cycle {
      upstream: a.name().to_string(),
      downstream: b.name().to_string(),
    });
  }

  a.links().downstream = Some(b.downgrade());
  b.links().upstream = Some(a.downgrade());
  debug!(upstream = %a.name(), downstream = %b.name(), "composed apps");

  Ok(Chain::from_member(b))
}

/// Clear both links of `app`, and the neighbours' links back to it.
/// Calling it on an unlinked app does nothing.
pub fn disconnect(app: &App) {
  let (upstream, downstream) = {
    let mut links = app.links();
    (links.upstream.take(), links.downstream.take())
  };
  let me = app.downgrade();

  if let Some(up) = upstream.and_then(|w| w.upgrade()) {
    let up = App { inner: up };
    let mut links = up.links();
    if links.downstream.as_ref().is_some_and(|w| Weak::ptr_eq(w, &me)) {
      links.downstream = None;
    }
  }
  if let Some(down) = downstream.and_then(|w| w.upgrade()) {
    let down = App { inner: down };
    let mut links = down.links();
    if links.upstream.as_ref().is_some_and(|w| Weak::ptr_eq(w, &me)) {
      links.upstream = None;
    }
  }
}

/// Iterate from `start` (exclusive) along one direction of links.
fn walk(start: &App, step: fn(&App) -> Option<App>) -> impl Iterator<Item = App> + use<> {
  std::iter::successors(step(start), move |app| step(app))
}

/// An ordered, non-empty sequence of linked apps.
#[derive(Debug, Clone)]
pub struct Chain {
  stages: Vec<App>,
}

impl Chain {
  /// The chain containing `app`, walked from its head to its tail.
  pub fn from_member(app: &App) -> Self {
    let mut stages: Vec<App> = walk(app, App::upstream).collect();
    stages.reverse();
    stages.push(app.clone());
    stages.extend(walk(app, App::downstream));
    Self { stages }
  }

  /// A single-stage chain.
  pub fn single(app: App) -> Self {
    Self { stages: vec![app] }
  }

  /// Compose this chain's tail with `next`.
  pub fn then(&self, next: &App) -> Result<Chain, ComposeError> {
    compose(self.tail(), next)
  }

  pub fn head(&self) -> &App {
    &self.stages[0]
  }

  pub fn tail(&self) -> &App {
    &self.stages[self.stages.len() - 1]
  }

  pub fn stages(&self) -> &[App] {
    &self.stages
  }

  pub fn iter(&self) -> impl Iterator<Item = &App> {
    self.stages.iter()
  }

  pub fn len(&self) -> usize {
    self.stages.len()
  }

  /// Always false; chains hold at least one stage.
  pub fn is_empty(&self) -> bool {
    self.stages.is_empty()
  }

  pub fn names(&self) -> Vec<&str> {
    self.stages.iter().map(App::name).collect()
  }

  /// Check that every stage is still linked to the next one. Fails once a
  /// stage has been disconnected or re-composed elsewhere.
  pub fn verify(&self) -> Result<(), ComposeError> {
    for pair in self.stages.windows(2) {
      let (up, down) = (&pair[0], &pair[1]);
      let linked = up.downstream().is_some_and(|d| d.same_instance(down))
        && down.upstream().is_some_and(|u| u.same_instance(up));
      if !linked {
        return Err(ComposeError::Unlinked {
          upstream: up.name().to_string(),
          downstream: down.name().to_string(),
        });
      }
    }
    Ok(())
  }

  /// Disconnect every stage.
  pub fn dissolve(self) {
    for stage in &self.stages {
      disconnect(stage);
    }
  }
}

impl std::fmt::Display for Chain {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.names().join(" + "))
  }
}
