use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use cogent_app::{App, AppArgs, AppDescriptor, AppError};
use tracing::debug;

use crate::error::RegistryError;
use crate::listing::AppListing;

/// A bundle of app declarations installed together, e.g. the built-in apps or
/// apps shipped by a third-party crate.
pub trait AppPlugin {
  /// Name used in error messages.
  fn name(&self) -> &str;

  /// Declare the plugin's apps.
  fn apps(&self) -> Result<Vec<AppDescriptor>, AppError>;
}

/// Registry of declared apps, keyed by qualified name.
///
/// Every query reads the current contents, so apps registered after the
/// registry was first used are always visible. Reads may happen concurrently;
/// registrations take a write lock.
#[derive(Default)]
pub struct Registry {
  apps: RwLock<BTreeMap<String, Arc<AppDescriptor>>>,
}

impl Registry {
  /// Create an empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Arc<AppDescriptor>>> {
    self.apps.read().unwrap_or_else(PoisonError::into_inner)
  }

  fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Arc<AppDescriptor>>> {
    self.apps.write().unwrap_or_else(PoisonError::into_inner)
  }

  /// Register a declared app under its qualified name.
  pub fn register(&self, descriptor: AppDescriptor) -> Result<Arc<AppDescriptor>, RegistryError> {
    let name = descriptor.qualified_name();
    let mut apps = self.write();

    if apps.contains_key(&name) {
      return Err(RegistryError::AlreadyRegistered { name });
    }

    let descriptor = Arc::new(descriptor);
    apps.insert(name.clone(), descriptor.clone());
    debug!(app = %name, role = %descriptor.role(), "registered app");
    Ok(descriptor)
  }

  /// Register every app a plugin declares. Nothing is registered if the
  /// plugin fails or any of its names is already taken.
  pub fn install(&self, plugin: &dyn AppPlugin) -> Result<usize, RegistryError> {
    let descriptors = plugin.apps().map_err(|source| RegistryError::Plugin {
      plugin: plugin.name().to_string(),
      source,
    })?;

    let mut apps = self.write();
    let mut staged = BTreeMap::new();
    for descriptor in descriptors {
      let name = descriptor.qualified_name();
      if apps.contains_key(&name) || staged.contains_key(&name) {
        return Err(RegistryError::AlreadyRegistered { name });
      }
      staged.insert(name, Arc::new(descriptor));
    }

    let count = staged.len();
    apps.append(&mut staged);
    debug!(plugin = plugin.name(), count, "installed plugin");
    Ok(count)
  }

  /// Remove an app by qualified name, returning its descriptor.
  pub fn remove(&self, qualified_name: &str) -> Option<Arc<AppDescriptor>> {
    self.write().remove(qualified_name)
  }

  pub fn contains(&self, qualified_name: &str) -> bool {
    self.read().contains_key(qualified_name)
  }

  pub fn len(&self) -> usize {
    self.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.read().is_empty()
  }

  /// All registered apps whose qualified name contains `filter`, sorted by
  /// qualified name. An empty filter matches everything.
  pub fn list(&self, filter: &str) -> Vec<Arc<AppDescriptor>> {
    self
      .read()
      .iter()
      .filter(|(name, _)| name.contains(filter))
      .map(|(_, d)| d.clone())
      .collect()
  }

  /// Tabular listing of [`list`](Self::list).
  pub fn available_apps(&self, filter: &str) -> AppListing {
    AppListing::from_descriptors(&self.list(filter))
  }

  /// Resolve a name to exactly one descriptor.
  ///
  /// An exact qualified name always wins. Otherwise a dotted name matches
  /// every app whose qualified name ends with `.{name}`, and a bare name
  /// matches every app with that short name. More than one match is
  /// ambiguous.
  pub fn resolve(&self, name: &str) -> Result<Arc<AppDescriptor>, RegistryError> {
    let apps = self.read();

    if let Some(descriptor) = apps.get(name) {
      return Ok(descriptor.clone());
    }

    let suffix = format!(".{}", name);
    let matches: Vec<(&String, &Arc<AppDescriptor>)> = if name.contains('.') {
      apps.iter().filter(|(q, _)| q.ends_with(&suffix)).collect()
    } else {
      apps.iter().filter(|(_, d)| d.name() == name).collect()
    };

    match matches.as_slice() {
      [] => Err(RegistryError::NotFound {
        name: name.to_string(),
      }),
      [(_, descriptor)] => Ok((*descriptor).clone()),
      _ => Err(RegistryError::Ambiguous {
        name: name.to_string(),
        candidates: matches.iter().map(|(q, _)| (*q).clone()).collect(),
      }),
    }
  }

  /// Resolve `name` and construct an instance with `args`.
  pub fn get(&self, name: &str, args: AppArgs) -> Result<App, RegistryError> {
    let descriptor = self.resolve(name)?;
    App::new(descriptor.clone(), &args).map_err(|source| RegistryError::Construction {
      name: descriptor.qualified_name(),
      source,
    })
  }
}

impl std::fmt::Debug for Registry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Registry")
      .field("apps", &self.read().keys().collect::<Vec<_>>())
      .finish()
  }
}
