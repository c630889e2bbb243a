use cogent_app::{AppArgs, Chain};
use cogent_config::PipelineDef;
use cogent_registry::Registry;
use tracing::debug;

use crate::error::ResolveError;

/// Resolves pipeline definitions against a registry.
pub struct PipelineResolver<'a> {
  registry: &'a Registry,
}

impl<'a> PipelineResolver<'a> {
  /// Create a new resolver over the given registry.
  pub fn new(registry: &'a Registry) -> Self {
    Self { registry }
  }

  /// Resolve a pipeline definition into a composed chain.
  ///
  /// This process:
  /// 1. Rejects pipelines without steps
  /// 2. Looks up and constructs each step's app
  /// 3. Composes each app with the previous one, in order
  ///
  /// Step indices in errors are zero-based.
  pub fn resolve(&self, def: PipelineDef) -> Result<Chain, ResolveError> {
    if def.steps.is_empty() {
      return Err(ResolveError::EmptyPipeline { name: def.name });
    }

    let mut chain: Option<Chain> = None;
    for (index, step) in def.steps.into_iter().enumerate() {
      let args = AppArgs::from_parts(step.args, step.kwargs);
      let app = self
        .registry
        .get(&step.app, args)
        .map_err(|source| ResolveError::Lookup {
          index,
          app: step.app.clone(),
          source,
        })?;

      chain = Some(match chain {
        None => Chain::single(app),
        Some(prev) => prev.then(&app).map_err(|source| ResolveError::Compose {
          index,
          app: step.app.clone(),
          source,
        })?,
      });
    }

    // The loop ran at least once.
    let chain = chain.ok_or_else(|| ResolveError::EmptyPipeline {
      name: def.name.clone(),
    })?;
    debug!(pipeline = %def.name, stages = chain.len(), "resolved pipeline");
    Ok(chain)
  }
}

#[cfg(test)]
mod tests {
  use cogent_app::{AppDescriptor, ComposeError, Outcome, ParamSpec, Role};
  use cogent_config::StepDef;
  use cogent_registry::RegistryError;
  use serde_json::Value;

  use super::*;

  fn registry() -> Registry {
    let registry = Registry::new();
    let apps = [
      ("io.load", Role::Loader, "", "SequenceCollection"),
      ("sample.trim", Role::Transformer, "SequenceCollection", "SequenceCollection"),
      ("dist.hamming", Role::Transformer, "Alignment", "DistanceMatrix"),
      ("io.write", Role::Writer, "SequenceCollection", "IdentifierType"),
    ];
    for (name, role, input, output) in apps {
      let mut builder = AppDescriptor::builder(name).role(role).output(output);
      if !input.is_empty() {
        builder = builder.input(input);
      }
      registry
        .register(
          builder
            .function(|v: Value| Ok(Outcome::Completed(v)))
            .build()
            .unwrap(),
        )
        .unwrap();
    }
    registry
      .register(
        AppDescriptor::builder("sample.min_length")
          .input("SequenceCollection")
          .output("SequenceCollection")
          .param(ParamSpec::required("length"))
          .function(|v: Value| Ok(Outcome::Completed(v)))
          .build()
          .unwrap(),
      )
      .unwrap();
    registry
  }

  fn pipeline(steps: Vec<StepDef>) -> PipelineDef {
    PipelineDef {
      name: "test".to_string(),
      description: String::new(),
      steps,
    }
  }

  #[test]
  fn test_resolve_linear_pipeline() {
    let registry = registry();
    let resolver = PipelineResolver::new(&registry);

    let chain = resolver
      .resolve(pipeline(vec![
        StepDef::new("load"),
        StepDef::new("min_length").arg(10),
        StepDef::new("trim"),
        StepDef::new("io.write"),
      ]))
      .unwrap();

    assert_eq!(chain.names(), vec!["load", "min_length", "trim", "write"]);
    assert_eq!(chain.head().role(), Role::Loader);
  }

  #[test]
  fn test_resolve_single_step() {
    let registry = registry();
    let chain = PipelineResolver::new(&registry)
      .resolve(pipeline(vec![StepDef::new("trim")]))
      .unwrap();
    assert_eq!(chain.len(), 1);
  }

  #[test]
  fn test_resolve_fails_on_empty_pipeline() {
    let registry = registry();
    let result = PipelineResolver::new(&registry).resolve(pipeline(vec![]));
    assert!(matches!(result, Err(ResolveError::EmptyPipeline { .. })));
  }

  #[test]
  fn test_resolve_fails_on_missing_app() {
    let registry = registry();
    let result = PipelineResolver::new(&registry)
      .resolve(pipeline(vec![StepDef::new("load"), StepDef::new("nope")]));
    assert!(matches!(
      result,
      Err(ResolveError::Lookup {
        index: 1,
        source: RegistryError::NotFound { .. },
        ..
      })
    ));
  }

  #[test]
  fn test_resolve_fails_on_bad_arguments() {
    let registry = registry();
    let result = PipelineResolver::new(&registry)
      .resolve(pipeline(vec![StepDef::new("min_length")]));
    assert!(matches!(
      result,
      Err(ResolveError::Lookup {
        source: RegistryError::Construction { .. },
        ..
      })
    ));
  }

  #[test]
  fn test_resolve_fails_on_incompatible_step() {
    let registry = registry();
    let result = PipelineResolver::new(&registry).resolve(pipeline(vec![
      StepDef::new("load"),
      StepDef::new("hamming"),
    ]));
    match result {
      Err(ResolveError::Compose { index, source, .. }) => {
        assert_eq!(index, 1);
        assert!(matches!(source, ComposeError::Incompatible { .. }));
      }
      other => panic!("expected compose error, got {:?}", other.map(|c| c.to_string())),
    }
  }

  #[test]
  fn test_resolve_fails_on_writer_mid_pipeline() {
    let registry = registry();
    let result = PipelineResolver::new(&registry).resolve(pipeline(vec![
      StepDef::new("io.write"),
      StepDef::new("trim"),
    ]));
    assert!(matches!(result, Err(ResolveError::Compose { .. })));
  }
}
