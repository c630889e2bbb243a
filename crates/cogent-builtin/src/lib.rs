//! Cogent Builtin
//!
//! The apps shipped with cogent, grouped by namespace:
//!
//! | namespace   | apps                                                        |
//! |-------------|-------------------------------------------------------------|
//! | `io`        | `load_json`, `load_fasta`, `write_json`, `write_fasta`      |
//! | `sample`    | `min_length`, `fixed_length`, `take_n_seqs`,                |
//! |             | `take_named_seqs`, `omit_duplicated`, `omit_degenerates`    |
//! | `align`     | `pad_gaps`                                                  |
//! | `dist`      | `hamming`                                                   |
//! | `tree`      | `quick_tree`                                                |
//! | `serialise` | `to_json`                                                   |
//!
//! Sequence collections travel as JSON objects of name to sequence, distance
//! matrices as `{"names": [..], "dists": [[..]]}` and trees as Newick strings.

mod align;
mod dist;
mod io;
mod sample;
mod seqs;
mod serialise;
mod tree;

use cogent_app::{AppDescriptor, AppError};
use cogent_registry::{AppPlugin, Registry, RegistryError};

/// Plugin declaring every built-in app.
#[derive(Debug, Clone, Copy, Default)]
pub struct Builtins;

impl AppPlugin for Builtins {
  fn name(&self) -> &str {
    "builtin"
  }

  fn apps(&self) -> Result<Vec<AppDescriptor>, AppError> {
    let mut apps = io::apps()?;
    apps.extend(sample::apps()?);
    apps.extend(align::apps()?);
    apps.extend(dist::apps()?);
    apps.extend(tree::apps()?);
    apps.extend(serialise::apps()?);
    Ok(apps)
  }
}

/// Install the built-in apps into `registry`, returning how many were added.
pub fn install(registry: &Registry) -> Result<usize, RegistryError> {
  registry.install(&Builtins)
}

/// A fresh registry holding only the built-in apps.
pub fn registry() -> Result<Registry, RegistryError> {
  let registry = Registry::new();
  install(&registry)?;
  Ok(registry)
}
