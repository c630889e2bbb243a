//! Parameter schemas and construction arguments.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;

/// Keyword argument that renames an app instance.
pub const NAME_KWARG: &str = "name";

/// One declared construction parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
  pub name: String,
  /// Value used when the argument is omitted. `None` makes the parameter
  /// required.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub default: Option<Value>,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub description: String,
}

impl ParamSpec {
  pub fn required(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      default: None,
      description: String::new(),
    }
  }

  pub fn optional(name: impl Into<String>, default: Value) -> Self {
    Self {
      name: name.into(),
      default: Some(default),
      description: String::new(),
    }
  }

  pub fn describe(mut self, description: impl Into<String>) -> Self {
    self.description = description.into();
    self
  }

  pub fn is_required(&self) -> bool {
    self.default.is_none()
  }
}

/// Ordered parameter declarations. Positional arguments bind in this order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamSchema(Vec<ParamSpec>);

impl ParamSchema {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, spec: ParamSpec) {
    self.0.push(spec);
  }

  pub fn get(&self, name: &str) -> Option<&ParamSpec> {
    self.0.iter().find(|p| p.name == name)
  }

  pub fn iter(&self) -> impl Iterator<Item = &ParamSpec> {
    self.0.iter()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Bind construction arguments against the schema.
  ///
  /// Positional arguments fill parameters in declaration order; keyword
  /// arguments fill by name. The reserved `name` keyword is accepted even when
  /// the schema does not declare it; see [`AppArgs::instance_name`].
  pub fn bind(&self, app: &str, args: &AppArgs) -> Result<Params, AppError> {
    if args.positional.len() > self.0.len() {
      return Err(AppError::invalid_argument(
        app,
        format!(
          "takes {} positional argument(s) but {} were given",
          self.0.len(),
          args.positional.len()
        ),
      ));
    }

    let mut values = Map::new();
    for (spec, value) in self.0.iter().zip(&args.positional) {
      values.insert(spec.name.clone(), value.clone());
    }

    for (key, value) in &args.keyword {
      if self.get(key).is_none() {
        if key == NAME_KWARG {
          continue;
        }
        return Err(AppError::invalid_argument(
          app,
          format!("unexpected keyword argument '{}'", key),
        ));
      }
      if values.contains_key(key) {
        return Err(AppError::invalid_argument(
          app,
          format!("got multiple values for argument '{}'", key),
        ));
      }
      values.insert(key.clone(), value.clone());
    }

    for spec in &self.0 {
      if values.contains_key(&spec.name) {
        continue;
      }
      match &spec.default {
        Some(default) => {
          values.insert(spec.name.clone(), default.clone());
        }
        None => {
          return Err(AppError::invalid_argument(
            app,
            format!("missing required argument '{}'", spec.name),
          ));
        }
      }
    }

    Ok(Params {
      app: app.to_string(),
      values,
    })
  }
}

impl FromIterator<ParamSpec> for ParamSchema {
  fn from_iter<I: IntoIterator<Item = ParamSpec>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

/// Construction arguments supplied when requesting an app instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppArgs {
  #[serde(default)]
  pub positional: Vec<Value>,
  #[serde(default)]
  pub keyword: Map<String, Value>,
}

impl AppArgs {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_parts(positional: Vec<Value>, keyword: Map<String, Value>) -> Self {
    Self {
      positional,
      keyword,
    }
  }

  pub fn arg(mut self, value: impl Into<Value>) -> Self {
    self.positional.push(value.into());
    self
  }

  pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.keyword.insert(key.into(), value.into());
    self
  }

  /// The instance name requested through the `name` keyword, if it is a
  /// string.
  pub fn instance_name(&self) -> Option<&str> {
    self.keyword.get(NAME_KWARG).and_then(Value::as_str)
  }
}

/// Parameters bound to a concrete app instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
  app: String,
  values: Map<String, Value>,
}

impl Params {
  pub fn get(&self, name: &str) -> Option<&Value> {
    self.values.get(name)
  }

  /// Deserialize a bound parameter into `T`.
  pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, AppError> {
    let value = self.values.get(name).ok_or_else(|| {
      AppError::invalid_argument(&self.app, format!("unknown parameter '{}'", name))
    })?;
    serde_json::from_value(value.clone()).map_err(|e| {
      AppError::invalid_argument(&self.app, format!("parameter '{}': {}", name, e))
    })
  }

  pub fn as_map(&self) -> &Map<String, Value> {
    &self.values
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn schema() -> ParamSchema {
    [
      ParamSpec::required("length"),
      ParamSpec::optional("moltype", json!("dna")),
    ]
    .into_iter()
    .collect()
  }

  #[test]
  fn test_bind_positional_and_default() {
    let params = schema().bind("min_length", &AppArgs::new().arg(100)).unwrap();
    assert_eq!(params.get("length"), Some(&json!(100)));
    assert_eq!(params.get("moltype"), Some(&json!("dna")));
    assert_eq!(params.get_as::<usize>("length").unwrap(), 100);
  }

  #[test]
  fn test_bind_keyword() {
    let args = AppArgs::new().kwarg("length", 5).kwarg("moltype", "rna");
    let params = schema().bind("min_length", &args).unwrap();
    assert_eq!(params.get_as::<String>("moltype").unwrap(), "rna");
  }

  #[test]
  fn test_bind_missing_required() {
    let err = schema().bind("min_length", &AppArgs::new()).unwrap_err();
    assert!(err.to_string().contains("missing required argument 'length'"));
  }

  #[test]
  fn test_bind_too_many_positional() {
    let args = AppArgs::new().arg(1).arg("dna").arg(true);
    let err = schema().bind("min_length", &args).unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument { .. }));
  }

  #[test]
  fn test_bind_duplicate_value() {
    let args = AppArgs::new().arg(1).kwarg("length", 2);
    let err = schema().bind("min_length", &args).unwrap_err();
    assert!(err.to_string().contains("multiple values"));
  }

  #[test]
  fn test_bind_unknown_keyword() {
    let args = AppArgs::new().arg(1).kwarg("colour", "red");
    let err = schema().bind("min_length", &args).unwrap_err();
    assert!(err.to_string().contains("unexpected keyword argument 'colour'"));
  }

  #[test]
  fn test_name_kwarg_always_accepted() {
    let args = AppArgs::new().arg(1).kwarg("name", "strict");
    assert!(schema().bind("min_length", &args).is_ok());
    assert_eq!(args.instance_name(), Some("strict"));
  }

  #[test]
  fn test_declared_name_param_is_bound() {
    let schema: ParamSchema = [ParamSpec::required("model"), ParamSpec::optional("name", json!(null))]
      .into_iter()
      .collect();
    let args = AppArgs::new().arg("F81").kwarg("name", "F81-model");
    let params = schema.bind("model", &args).unwrap();
    assert_eq!(params.get("name"), Some(&json!("F81-model")));
  }

  #[test]
  fn test_get_as_wrong_type() {
    let params = schema().bind("min_length", &AppArgs::new().arg("long")).unwrap();
    assert!(params.get_as::<usize>("length").is_err());
  }
}
