//! Loaders and writers.
//!
//! Loaders take a path and report unreadable or malformed files as
//! `NotCompleted` errors, so one bad input does not stop a batch. Writers
//! treat filesystem failures as faults.

use std::fs;
use std::path::PathBuf;

use cogent_app::{
  AppDescriptor, AppDescriptorBuilder, AppError, AppFunction, NotCompleted, Outcome, ParamSpec,
  Role,
};
use serde_json::{Value, json};
use tracing::debug;

use crate::seqs::SeqCollection;

const PATH: &str = "IdentifierType | str";

pub(crate) fn apps() -> Result<Vec<AppDescriptor>, AppError> {
  Ok(vec![load_json()?, load_fasta()?, write_json()?, write_fasta()?])
}

fn load_json() -> Result<AppDescriptor, AppError> {
  AppDescriptor::builder("io.load_json")
    .role(Role::Loader)
    .input(PATH)
    .output("SequenceCollection")
    .description("load a sequence collection from a JSON object of name to sequence")
    .function(|input: Value| {
      Ok(load(&input, |text| {
        let value: Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
        SeqCollection::from_value(&value).map_err(|nc| nc.message)
      }))
    })
    .build()
}

fn load_fasta() -> Result<AppDescriptor, AppError> {
  AppDescriptor::builder("io.load_fasta")
    .role(Role::Loader)
    .input(PATH)
    .output("SequenceCollection")
    .description("load a sequence collection from a FASTA file")
    .function(|input: Value| Ok(load(&input, SeqCollection::from_fasta)))
    .build()
}

fn load<F>(input: &Value, parse: F) -> Outcome
where
  F: FnOnce(&str) -> Result<SeqCollection, String>,
{
  let Some(path) = input.as_str() else {
    return NotCompleted::error(format!("expected a path, got {}", input)).into();
  };

  let text = match fs::read_to_string(path) {
    Ok(text) => text,
    Err(e) => {
      return NotCompleted::error(format!("cannot read file: {}", e))
        .with_source(path)
        .into();
    }
  };

  match parse(&text) {
    Ok(seqs) => {
      debug!(%path, seqs = seqs.len(), "loaded sequences");
      Outcome::Completed(seqs.into_value())
    }
    Err(message) => NotCompleted::error(message).with_source(path).into(),
  }
}

fn writer_params(builder: AppDescriptorBuilder) -> AppDescriptorBuilder {
  builder
    .role(Role::Writer)
    .output("IdentifierType")
    .param(ParamSpec::required("dir").describe("output directory, created if missing"))
    .param(ParamSpec::optional("stem", json!("output")).describe("file name without suffix"))
}

fn write_json() -> Result<AppDescriptor, AppError> {
  writer_params(AppDescriptor::builder("io.write_json"))
    .input("SerialisableType | SeqsCollectionType | DistanceMatrix | Tree")
    .description("write the input as JSON; strings are written as is")
    .constructor(|params| {
      let path = target(params.get_as("dir")?, params.get_as("stem")?, "json");
      Ok(writer(path, |value| match value {
        Value::String(s) => Ok(s),
        other => Ok(serde_json::to_string_pretty(&other)?),
      }))
    })
    .build()
}

fn write_fasta() -> Result<AppDescriptor, AppError> {
  writer_params(AppDescriptor::builder("io.write_fasta"))
    .input("SeqsCollectionType")
    .description("write a sequence collection in FASTA format")
    .constructor(|params| {
      let path = target(params.get_as("dir")?, params.get_as("stem")?, "fasta");
      Ok(writer(path, |value| {
        let seqs = SeqCollection::from_value(&value)
          .map_err(|nc| AppError::fault("write_fasta", nc.message))?;
        Ok(seqs.to_fasta())
      }))
    })
    .build()
}

fn target(dir: PathBuf, stem: String, suffix: &str) -> PathBuf {
  dir.join(format!("{}.{}", stem, suffix))
}

fn writer<F>(path: PathBuf, render: F) -> Box<dyn AppFunction>
where
  F: Fn(Value) -> Result<String, AppError> + Send + Sync + 'static,
{
  Box::new(move |value: Value| -> Result<Outcome, AppError> {
    let text = render(value)?;
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(&path, text)?;
    debug!(path = %path.display(), "wrote output");
    Ok(Outcome::Completed(Value::String(path.display().to_string())))
  })
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use cogent_app::{App, AppArgs, FailureKind};
  use tempfile::TempDir;

  use super::*;

  fn instance(desc: AppDescriptor, args: AppArgs) -> App {
    App::new(Arc::new(desc), &args).unwrap()
  }

  #[test]
  fn test_load_fasta() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("seqs.fasta");
    fs::write(&path, ">a\nACGT\n>b\nAC\n").unwrap();

    let app = instance(load_fasta().unwrap(), AppArgs::new());
    let outcome = app.call(json!(path.display().to_string())).unwrap();
    assert_eq!(outcome, Outcome::Completed(json!({"a": "ACGT", "b": "AC"})));
  }

  #[test]
  fn test_load_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("seqs.json");
    fs::write(&path, r#"{"a": "ACGT"}"#).unwrap();

    let app = instance(load_json().unwrap(), AppArgs::new());
    let outcome = app.call(json!(path.display().to_string())).unwrap();
    assert_eq!(outcome, Outcome::Completed(json!({"a": "ACGT"})));
  }

  #[test]
  fn test_load_missing_file_is_not_completed() {
    let app = instance(load_fasta().unwrap(), AppArgs::new());
    let outcome = app.call(json!("/definitely/not/here.fasta")).unwrap();
    let nc = outcome.not_completed().unwrap();
    assert_eq!(nc.kind, FailureKind::Error);
    assert_eq!(nc.origin, "load_fasta");
    assert_eq!(nc.source.as_deref(), Some("/definitely/not/here.fasta"));
  }

  #[test]
  fn test_load_malformed_json_is_not_completed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, "[1, 2").unwrap();

    let app = instance(load_json().unwrap(), AppArgs::new());
    let outcome = app.call(json!(path.display().to_string())).unwrap();
    assert!(!outcome.is_completed());
  }

  #[test]
  fn test_load_fasta_duplicate_labels_is_not_completed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dup.fasta");
    fs::write(&path, ">a\nAAAA\n>a\nCCCC\n>b\nGGGG\n").unwrap();
    let source = path.display().to_string();

    let app = instance(load_fasta().unwrap(), AppArgs::new());
    let outcome = app.call(json!(source)).unwrap();
    let nc = outcome.not_completed().unwrap();
    assert_eq!(nc.kind, FailureKind::Error);
    assert_eq!(nc.origin, "load_fasta");
    assert_eq!(nc.source.as_deref(), Some(source.as_str()));
    assert!(nc.message.contains("duplicate sequence label 'a'"));
  }

  #[test]
  fn test_load_rejects_non_path_input() {
    let app = instance(load_json().unwrap(), AppArgs::new());
    assert!(!app.call(json!(12)).unwrap().is_completed());
  }

  #[test]
  fn test_write_fasta_returns_path() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("nested");
    let app = instance(
      write_fasta().unwrap(),
      AppArgs::new().arg(out.display().to_string()).kwarg("stem", "aln"),
    );

    let outcome = app.call(json!({"a": "AC"})).unwrap();
    let expected = out.join("aln.fasta");
    assert_eq!(outcome, Outcome::Completed(json!(expected.display().to_string())));
    assert_eq!(fs::read_to_string(expected).unwrap(), ">a\nAC\n");
  }

  #[test]
  fn test_write_json_writes_strings_verbatim() {
    let dir = TempDir::new().unwrap();
    let app = instance(
      write_json().unwrap(),
      AppArgs::new().arg(dir.path().display().to_string()),
    );

    app.call(json!("((a:1,b:1):0);")).unwrap();
    let written = fs::read_to_string(dir.path().join("output.json")).unwrap();
    assert_eq!(written, "((a:1,b:1):0);");
  }

  #[test]
  fn test_write_failure_is_fault() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, "x").unwrap();

    // A regular file where the output directory should be.
    let app = instance(
      write_json().unwrap(),
      AppArgs::new().arg(blocker.join("sub").display().to_string()),
    );
    assert!(matches!(app.call(json!({"a": "A"})), Err(AppError::Io(_))));
  }

  #[test]
  fn test_write_fasta_bad_payload_is_fault() {
    let dir = TempDir::new().unwrap();
    let app = instance(
      write_fasta().unwrap(),
      AppArgs::new().arg(dir.path().display().to_string()),
    );
    assert!(matches!(app.call(json!(3)), Err(AppError::Fault { .. })));
  }
}
