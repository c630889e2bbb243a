//! App declaration.
//!
//! An [`AppDescriptor`] is the immutable metadata for one kind of app: its
//! qualified name, role, type contracts and parameter schema, plus the
//! constructor that turns bound parameters into a runnable function. It is
//! computed once when the app is declared and shared by every instance.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::instance::AppFunction;
use crate::outcome::{NotCompleted, Outcome};
use crate::params::{ParamSchema, ParamSpec, Params};
use crate::types::{Tagged, TypeSet, TypeTags};

/// Namespace given to apps declared without one.
pub const LOCAL_NAMESPACE: &str = "local";

/// Composable role of an app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  /// Originates data. Always the head of a chain.
  Loader,
  /// Persists or emits data. Never feeds a downstream app.
  Writer,
  /// Transforms data.
  Transformer,
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Role::Loader => f.write_str("loader"),
      Role::Writer => f.write_str("writer"),
      Role::Transformer => f.write_str("transformer"),
    }
  }
}

/// Builds the function for one instance from its bound parameters.
pub type Constructor =
  Arc<dyn Fn(&Params) -> Result<Box<dyn AppFunction>, AppError> + Send + Sync>;

/// Immutable metadata describing a declared app.
#[derive(Clone)]
pub struct AppDescriptor {
  name: String,
  namespace: String,
  role: Role,
  data_types: TypeSet,
  return_types: TypeSet,
  params: ParamSchema,
  description: String,
  constructor: Constructor,
}

impl AppDescriptor {
  /// Start declaring an app. `name` may be qualified (`"sample.min_length"`);
  /// everything before the last dot becomes the namespace.
  pub fn builder(name: impl Into<String>) -> AppDescriptorBuilder {
    AppDescriptorBuilder::new(name.into())
  }

  /// Declare a transformer from a typed function.
  ///
  /// The input and output type sets come from [`Tagged`]. Inputs that do not
  /// deserialize into `I` produce a `NotCompleted` error outcome rather than a
  /// fault.
  pub fn from_fn<I, O, F>(name: impl Into<String>, f: F) -> Result<Self, AppError>
  where
    I: DeserializeOwned + Tagged + 'static,
    O: Serialize + Tagged + 'static,
    F: Fn(I) -> O + Send + Sync + 'static,
  {
    let f = Arc::new(f);
    Self::builder(name)
      .input_set(I::type_tags())
      .output_set(O::type_tags())
      .constructor(move |_params| {
        let f = f.clone();
        Ok(Box::new(move |input: Value| -> Result<Outcome, AppError> {
          let input: I = match serde_json::from_value(input) {
            Ok(i) => i,
            Err(e) => {
              return Ok(Outcome::NotCompleted(NotCompleted::error(format!(
                "invalid input: {}",
                e
              ))));
            }
          };
          Ok(Outcome::Completed(serde_json::to_value(f(input))?))
        }) as Box<dyn AppFunction>)
      })
      .build()
  }

  /// Short name, without namespace.
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn namespace(&self) -> &str {
    &self.namespace
  }

  /// `namespace.name`.
  pub fn qualified_name(&self) -> String {
    format!("{}.{}", self.namespace, self.name)
  }

  pub fn role(&self) -> Role {
    self.role
  }

  /// Accepted input types.
  pub fn data_types(&self) -> &TypeSet {
    &self.data_types
  }

  /// Produced output types.
  pub fn return_types(&self) -> &TypeSet {
    &self.return_types
  }

  pub fn params(&self) -> &ParamSchema {
    &self.params
  }

  pub fn description(&self) -> &str {
    &self.description
  }

  /// Run the constructor against already-bound parameters.
  pub(crate) fn construct(&self, params: &Params) -> Result<Box<dyn AppFunction>, AppError> {
    (self.constructor)(params)
  }
}

impl fmt::Debug for AppDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AppDescriptor")
      .field("name", &self.name)
      .field("namespace", &self.namespace)
      .field("role", &self.role)
      .field("data_types", &self.data_types)
      .field("return_types", &self.return_types)
      .field("params", &self.params)
      .finish_non_exhaustive()
  }
}

/// Builder returned by [`AppDescriptor::builder`].
pub struct AppDescriptorBuilder {
  name: String,
  namespace: Option<String>,
  role: Role,
  tags: TypeTags,
  data_types: TypeSet,
  return_types: TypeSet,
  params: ParamSchema,
  description: String,
  constructor: Option<Constructor>,
}

impl AppDescriptorBuilder {
  fn new(name: String) -> Self {
    let (namespace, name) = match name.rsplit_once('.') {
      Some((ns, short)) => (Some(ns.to_string()), short.to_string()),
      None => (None, name),
    };
    Self {
      name,
      namespace,
      role: Role::Transformer,
      tags: TypeTags::default(),
      data_types: TypeSet::new(),
      return_types: TypeSet::new(),
      params: ParamSchema::new(),
      description: String::new(),
      constructor: None,
    }
  }

  pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
    self.namespace = Some(namespace.into());
    self
  }

  pub fn role(mut self, role: Role) -> Self {
    self.role = role;
    self
  }

  /// Tag registry used to canonicalise the declarations passed to
  /// [`input`](Self::input) and [`output`](Self::output). Set it before
  /// declaring types.
  pub fn type_tags(mut self, tags: TypeTags) -> Self {
    self.tags = tags;
    self
  }

  /// Declare an accepted input type, e.g. `"SequenceCollection | Alignment"`.
  pub fn input(mut self, declaration: &str) -> Self {
    self.data_types = self.data_types.union(&self.tags.canonical(declaration));
    self
  }

  /// Declare a produced output type.
  pub fn output(mut self, declaration: &str) -> Self {
    self.return_types = self.return_types.union(&self.tags.canonical(declaration));
    self
  }

  pub fn input_set(mut self, types: TypeSet) -> Self {
    self.data_types = self.data_types.union(&types);
    self
  }

  pub fn output_set(mut self, types: TypeSet) -> Self {
    self.return_types = self.return_types.union(&types);
    self
  }

  pub fn param(mut self, spec: ParamSpec) -> Self {
    self.params.push(spec);
    self
  }

  pub fn description(mut self, description: impl Into<String>) -> Self {
    self.description = description.into();
    self
  }

  pub fn constructor<F>(mut self, constructor: F) -> Self
  where
    F: Fn(&Params) -> Result<Box<dyn AppFunction>, AppError> + Send + Sync + 'static,
  {
    self.constructor = Some(Arc::new(constructor));
    self
  }

  /// Declare a stateless app whose function ignores its parameters.
  pub fn function<F>(self, f: F) -> Self
  where
    F: Fn(Value) -> Result<Outcome, AppError> + Send + Sync + Clone + 'static,
  {
    self.constructor(move |_params| Ok(Box::new(f.clone()) as Box<dyn AppFunction>))
  }

  pub fn build(self) -> Result<AppDescriptor, AppError> {
    let namespace = self
      .namespace
      .unwrap_or_else(|| LOCAL_NAMESPACE.to_string());
    let qualified = format!("{}.{}", namespace, self.name);
    let invalid = |message: &str| AppError::InvalidDeclaration {
      app: qualified.clone(),
      message: message.to_string(),
    };

    if !is_identifier(&self.name) {
      return Err(invalid("name must be a non-empty identifier"));
    }
    if !namespace.split('.').all(is_identifier) {
      return Err(invalid("namespace must be dot-separated identifiers"));
    }
    if self.role != Role::Loader && self.data_types.is_empty() {
      return Err(invalid("input types must be declared"));
    }
    if self.return_types.is_empty() {
      return Err(invalid("output types must be declared"));
    }
    let Some(constructor) = self.constructor else {
      return Err(invalid("no constructor or function given"));
    };

    Ok(AppDescriptor {
      name: self.name,
      namespace,
      role: self.role,
      data_types: self.data_types,
      return_types: self.return_types,
      params: self.params,
      description: self.description,
      constructor,
    })
  }
}

fn is_identifier(s: &str) -> bool {
  let mut chars = s.chars();
  matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn identity(v: Value) -> Result<Outcome, AppError> {
    Ok(Outcome::Completed(v))
  }

  #[test]
  fn test_qualified_name_splits_namespace() {
    let desc = AppDescriptor::builder("sample.min_length")
      .input("SequenceCollection")
      .output("SequenceCollection")
      .function(identity)
      .build()
      .unwrap();
    assert_eq!(desc.name(), "min_length");
    assert_eq!(desc.namespace(), "sample");
    assert_eq!(desc.qualified_name(), "sample.min_length");
    assert_eq!(desc.role(), Role::Transformer);
  }

  #[test]
  fn test_unqualified_name_is_local() {
    let desc = AppDescriptor::builder("dummy")
      .input("int")
      .output("int")
      .function(identity)
      .build()
      .unwrap();
    assert_eq!(desc.qualified_name(), "local.dummy");
  }

  #[test]
  fn test_types_are_canonicalised() {
    let desc = AppDescriptor::builder("seqs.fix")
      .input("SeqsCollectionType")
      .output("Optional[Alignment]")
      .function(identity)
      .build()
      .unwrap();
    assert!(desc.data_types().contains("SequenceCollection"));
    assert!(desc.data_types().contains("Alignment"));
    assert_eq!(desc.return_types().len(), 1);
  }

  #[test]
  fn test_loader_needs_no_input_types() {
    let desc = AppDescriptor::builder("io.load")
      .role(Role::Loader)
      .output("SequenceCollection")
      .function(identity)
      .build();
    assert!(desc.is_ok());
  }

  #[test]
  fn test_transformer_needs_input_types() {
    let err = AppDescriptor::builder("t")
      .output("int")
      .function(identity)
      .build()
      .unwrap_err();
    assert!(matches!(err, AppError::InvalidDeclaration { .. }));
  }

  #[test]
  fn test_rejects_bad_name() {
    let err = AppDescriptor::builder("sample.")
      .input("int")
      .output("int")
      .function(identity)
      .build()
      .unwrap_err();
    assert!(err.to_string().contains("identifier"));
  }

  #[test]
  fn test_missing_constructor() {
    let err = AppDescriptor::builder("t")
      .input("int")
      .output("int")
      .build()
      .unwrap_err();
    assert!(err.to_string().contains("constructor"));
  }

  #[test]
  fn test_from_fn_infers_types() {
    let desc = AppDescriptor::from_fn("double", |v: i64| v * 2).unwrap();
    assert!(desc.data_types().contains("int"));
    assert!(desc.return_types().contains("int"));
    assert_eq!(desc.params().len(), 0);
  }

  #[test]
  fn test_from_fn_bad_input_is_not_completed() {
    let desc = AppDescriptor::from_fn("double", |v: i64| v * 2).unwrap();
    let params = desc.params().bind("double", &Default::default()).unwrap();
    let f = desc.construct(&params).unwrap();
    let out = f.apply(json!("five")).unwrap();
    assert!(!out.is_completed());
  }
}
