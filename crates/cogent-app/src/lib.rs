//! Cogent App
//!
//! This crate defines what an "app" is in cogent: a declared unit of data
//! transformation with typed input/output contracts, and the rules for
//! composing apps into chains.
//!
//! - [`TypeTags`] canonicalises type declarations into [`TypeSet`]s.
//! - [`AppDescriptor`] is the immutable declaration of an app.
//! - [`App`] is a constructed, callable instance.
//! - [`compose`] links two instances into a [`Chain`] after checking roles
//!   and type contracts.
//!
//! Apps exchange `serde_json::Value`s. A stage reports per-input failures as
//! [`Outcome::NotCompleted`] and faults as [`AppError`].

mod compose;
mod descriptor;
mod error;
mod instance;
mod outcome;
mod params;
mod types;

pub use compose::{Chain, ComposeError, Incompatibility, check_compatible, compose, disconnect};
pub use descriptor::{AppDescriptor, AppDescriptorBuilder, Constructor, LOCAL_NAMESPACE, Role};
pub use error::AppError;
pub use instance::{App, AppFunction, is_app};
pub use outcome::{FailureKind, NotCompleted, Outcome};
pub use params::{AppArgs, NAME_KWARG, ParamSchema, ParamSpec, Params};
pub use types::{IDENTIFIER, SERIALISABLE, Tagged, TypeSet, TypeTag, TypeTags};
