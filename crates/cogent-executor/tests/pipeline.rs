use std::fs;
use std::path::Path;

use cogent_app::{AppArgs, AppError, Chain, FailureKind};
use cogent_executor::{PipelineExecutor, StageStatus};
use cogent_registry::Registry;
use serde_json::json;
use tempfile::TempDir;

fn tree_pipeline(registry: &Registry, out: &Path) -> Chain {
  let get = |name: &str, args: AppArgs| registry.get(name, args).unwrap();
  Chain::single(get("load_fasta", AppArgs::new()))
    .then(&get("min_length", AppArgs::new().arg(4)))
    .unwrap()
    .then(&get("pad_gaps", AppArgs::new()))
    .unwrap()
    .then(&get("hamming", AppArgs::new()))
    .unwrap()
    .then(&get("quick_tree", AppArgs::new()))
    .unwrap()
    .then(&get(
      "write_json",
      AppArgs::new()
        .arg(out.display().to_string())
        .kwarg("stem", "tree"),
    ))
    .unwrap()
}

fn fasta(dir: &TempDir, name: &str, text: &str) -> String {
  let path = dir.path().join(name);
  fs::write(&path, text).unwrap();
  path.display().to_string()
}

#[test]
fn test_tree_pipeline_end_to_end() {
  let registry = cogent_builtin::registry().unwrap();
  let dir = TempDir::new().unwrap();
  let out = dir.path().join("out");
  let chain = tree_pipeline(&registry, &out);
  let input = fasta(&dir, "seqs.fasta", ">a\nAAAA\n>b\nAATT\n>c\nAAAT\n");

  let result = PipelineExecutor::new().run(&chain, json!(input)).unwrap();

  let written = out.join("tree.json");
  assert_eq!(result.outcome.value(), Some(&json!(written.display().to_string())));
  assert_eq!(
    fs::read_to_string(written).unwrap(),
    "(b:0.1875,(a:0.125,c:0.125):0.0625);"
  );
  assert!(result.stages.iter().all(|r| r.status == StageStatus::Completed));
}

#[test]
fn test_short_sequences_stop_before_writing() {
  let registry = cogent_builtin::registry().unwrap();
  let dir = TempDir::new().unwrap();
  let out = dir.path().join("out");
  let chain = tree_pipeline(&registry, &out);
  let input = fasta(&dir, "short.fasta", ">a\nAAAA\n>b\nAA\n");

  let result = PipelineExecutor::new().run(&chain, json!(input)).unwrap();

  let nc = result.not_completed().unwrap();
  assert_eq!(nc.kind, FailureKind::Fail);
  assert_eq!(nc.origin, "min_length");
  assert_eq!(nc.message, "2 < min_length 4");
  assert_eq!(result.invoked(), vec!["load_fasta", "min_length"]);
  assert!(!out.exists());
}

#[test]
fn test_missing_input_is_carried_not_raised() {
  let registry = cogent_builtin::registry().unwrap();
  let dir = TempDir::new().unwrap();
  let chain = tree_pipeline(&registry, &dir.path().join("out"));
  let missing = dir.path().join("missing.fasta").display().to_string();

  let result = PipelineExecutor::new().run(&chain, json!(missing)).unwrap();

  let nc = result.not_completed().unwrap();
  assert_eq!(nc.kind, FailureKind::Error);
  assert_eq!(nc.origin, "load_fasta");
  assert_eq!(nc.source.as_deref(), Some(missing.as_str()));
}

#[test]
fn test_batch_continues_past_not_completed() {
  let registry = cogent_builtin::registry().unwrap();
  let dir = TempDir::new().unwrap();
  let chain = tree_pipeline(&registry, &dir.path().join("out"));
  let good = fasta(&dir, "good.fasta", ">a\nACGT\n>b\nACGA\n");
  let bad = fasta(&dir, "bad.fasta", ">a\nA\n>b\nACGA\n");

  let results = PipelineExecutor::new().run_all(&chain, vec![json!(bad), json!(good)]);

  assert!(!results[0].as_ref().unwrap().is_completed());
  assert!(results[1].as_ref().unwrap().is_completed());
}

#[test]
fn test_writer_fault_is_returned() {
  let registry = cogent_builtin::registry().unwrap();
  let dir = TempDir::new().unwrap();
  let blocker = dir.path().join("blocker");
  fs::write(&blocker, "").unwrap();
  let chain = tree_pipeline(&registry, &blocker.join("out"));
  let input = fasta(&dir, "seqs.fasta", ">a\nAAAA\n>b\nAATT\n");

  let err = PipelineExecutor::new().run(&chain, json!(input)).unwrap_err();
  assert!(matches!(err, AppError::Io(_)));
}
