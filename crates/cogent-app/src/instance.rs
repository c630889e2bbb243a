//! Constructed app instances.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde_json::Value;

use crate::descriptor::{AppDescriptor, Role};
use crate::error::AppError;
use crate::outcome::Outcome;
use crate::params::{AppArgs, Params};
use crate::types::TypeSet;

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// The transformation performed by an app instance.
///
/// Return `Ok(Outcome::NotCompleted(..))` for per-input failures that the
/// rest of the pipeline should carry along, and `Err(..)` only for faults
/// that must stop the run.
pub trait AppFunction: Send + Sync {
  fn apply(&self, input: Value) -> Result<Outcome, AppError>;
}

impl<F> AppFunction for F
where
  F: Fn(Value) -> Result<Outcome, AppError> + Send + Sync,
{
  fn apply(&self, input: Value) -> Result<Outcome, AppError> {
    self(input)
  }
}

#[derive(Default)]
pub(crate) struct Links {
  pub(crate) upstream: Option<Weak<AppInner>>,
  pub(crate) downstream: Option<Weak<AppInner>>,
}

pub(crate) struct AppInner {
  id: u64,
  name: String,
  descriptor: Arc<AppDescriptor>,
  params: Params,
  function: Box<dyn AppFunction>,
  links: Mutex<Links>,
}

/// A configured, callable app instance.
///
/// `App` is a cheap handle; clones refer to the same instance. Instances hold
/// non-owning links to their neighbours in a chain, the stages themselves are
/// owned by whoever holds the [`Chain`](crate::Chain) or the handles.
#[derive(Clone)]
pub struct App {
  pub(crate) inner: Arc<AppInner>,
}

impl App {
  /// Bind `args` against the descriptor's schema and construct an instance.
  pub fn new(descriptor: Arc<AppDescriptor>, args: &AppArgs) -> Result<Self, AppError> {
    let params = descriptor.params().bind(descriptor.name(), args)?;
    let function = descriptor.construct(&params)?;
    let name = args
      .instance_name()
      .map(str::to_string)
      .unwrap_or_else(|| descriptor.name().to_string());

    Ok(Self {
      inner: Arc::new(AppInner {
        id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
        name,
        descriptor,
        params,
        function,
        links: Mutex::new(Links::default()),
      }),
    })
  }

  /// Process-unique instance id.
  pub fn id(&self) -> u64 {
    self.inner.id
  }

  /// Instance name; the descriptor's short name unless overridden with the
  /// `name` keyword.
  pub fn name(&self) -> &str {
    &self.inner.name
  }

  pub fn descriptor(&self) -> &Arc<AppDescriptor> {
    &self.inner.descriptor
  }

  pub fn role(&self) -> Role {
    self.inner.descriptor.role()
  }

  pub fn data_types(&self) -> &TypeSet {
    self.inner.descriptor.data_types()
  }

  pub fn return_types(&self) -> &TypeSet {
    self.inner.descriptor.return_types()
  }

  pub fn params(&self) -> &Params {
    &self.inner.params
  }

  /// Apply this instance, and only this instance, to `input`.
  ///
  /// A not-completed result without an origin is attributed to this
  /// instance.
  pub fn call(&self, input: Value) -> Result<Outcome, AppError> {
    let outcome = self.inner.function.apply(input)?;
    Ok(match outcome {
      Outcome::NotCompleted(mut nc) => {
        if nc.origin.is_empty() {
          nc.origin = self.inner.name.clone();
        }
        Outcome::NotCompleted(nc)
      }
      done => done,
    })
  }

  /// The instance this one receives input from.
  pub fn upstream(&self) -> Option<App> {
    self.inner.links().upstream.as_ref().and_then(upgrade)
  }

  /// The instance this one feeds.
  pub fn downstream(&self) -> Option<App> {
    self.inner.links().downstream.as_ref().and_then(upgrade)
  }

  /// Whether both handles refer to the same instance.
  pub fn same_instance(&self, other: &App) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }

  pub(crate) fn downgrade(&self) -> Weak<AppInner> {
    Arc::downgrade(&self.inner)
  }

  pub(crate) fn links(&self) -> MutexGuard<'_, Links> {
    self.inner.links()
  }
}

impl AppInner {
  fn links(&self) -> MutexGuard<'_, Links> {
    self.links.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

fn upgrade(weak: &Weak<AppInner>) -> Option<App> {
  weak.upgrade().map(|inner| App { inner })
}

impl PartialEq for App {
  fn eq(&self, other: &Self) -> bool {
    self.same_instance(other)
  }
}

impl Eq for App {}

impl fmt::Debug for App {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("App")
      .field("id", &self.inner.id)
      .field("name", &self.inner.name)
      .field("app", &self.inner.descriptor.qualified_name())
      .field("role", &self.role())
      .finish()
  }
}

impl fmt::Display for App {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.inner.name)
  }
}

/// Whether `obj` is a declared and constructed app instance.
pub fn is_app(obj: &dyn Any) -> bool {
  obj.is::<App>()
}
