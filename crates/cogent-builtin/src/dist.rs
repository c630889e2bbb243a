//! Pairwise distances.
//!
//! A distance matrix is `{"names": [..], "dists": [[..], ..]}`, square and
//! symmetric, with rows in `names` order.

use cogent_app::{AppDescriptor, AppError, NotCompleted, Outcome};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::seqs::SeqCollection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct DistanceMatrix {
  pub names: Vec<String>,
  pub dists: Vec<Vec<f64>>,
}

impl DistanceMatrix {
  pub fn from_value(value: Value) -> Result<Self, NotCompleted> {
    let matrix: Self = serde_json::from_value(value)
      .map_err(|e| NotCompleted::error(format!("expected a distance matrix: {}", e)))?;
    let n = matrix.names.len();
    if matrix.dists.len() != n || matrix.dists.iter().any(|row| row.len() != n) {
      return Err(NotCompleted::error(format!(
        "distance matrix is not {}x{}",
        n, n
      )));
    }
    Ok(matrix)
  }
}

pub(crate) fn apps() -> Result<Vec<AppDescriptor>, AppError> {
  Ok(vec![hamming()?])
}

fn hamming() -> Result<AppDescriptor, AppError> {
  AppDescriptor::builder("dist.hamming")
    .input("AlignedSeqsType")
    .output("DistanceMatrix")
    .description("proportion of differing positions between aligned sequences")
    .function(|value: Value| {
      let seqs = match SeqCollection::from_value(&value) {
        Ok(seqs) => seqs,
        Err(nc) => return Ok(nc.into()),
      };
      Ok(match hamming_matrix(&seqs) {
        Ok(matrix) => Outcome::Completed(serde_json::to_value(matrix)?),
        Err(nc) => nc.into(),
      })
    })
    .build()
}

fn hamming_matrix(seqs: &SeqCollection) -> Result<DistanceMatrix, NotCompleted> {
  if !seqs.is_aligned() {
    return Err(NotCompleted::error("sequences are not aligned"));
  }
  if seqs.lengths().next().unwrap_or(0) == 0 {
    return Err(NotCompleted::fail("sequences are empty"));
  }

  let rows: Vec<Vec<char>> = seqs
    .seqs
    .iter()
    .map(|s| s.seq.to_ascii_uppercase().chars().collect())
    .collect();
  let n = rows.len();
  let mut dists = vec![vec![0.0; n]; n];

  for i in 0..n {
    for j in (i + 1)..n {
      let differ = rows[i].iter().zip(&rows[j]).filter(|(a, b)| a != b).count();
      let d = differ as f64 / rows[i].len() as f64;
      dists[i][j] = d;
      dists[j][i] = d;
    }
  }

  Ok(DistanceMatrix {
    names: seqs.seqs.iter().map(|s| s.name.clone()).collect(),
    dists,
  })
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use cogent_app::{App, AppArgs, FailureKind};
  use serde_json::json;

  use super::*;

  fn app() -> App {
    App::new(Arc::new(hamming().unwrap()), &AppArgs::new()).unwrap()
  }

  #[test]
  fn test_hamming() {
    let outcome = app().call(json!({"a": "AAAA", "b": "AATT", "c": "aaaa"})).unwrap();
    assert_eq!(
      outcome,
      Outcome::Completed(json!({
        "names": ["a", "b", "c"],
        "dists": [[0.0, 0.5, 0.0], [0.5, 0.0, 0.5], [0.0, 0.5, 0.0]]
      }))
    );
  }

  #[test]
  fn test_unaligned_is_error() {
    let outcome = app().call(json!({"a": "AAAA", "b": "AA"})).unwrap();
    let nc = outcome.not_completed().unwrap();
    assert_eq!(nc.kind, FailureKind::Error);
    assert_eq!(nc.message, "sequences are not aligned");
  }

  #[test]
  fn test_empty_sequences_fail() {
    let outcome = app().call(json!({"a": "", "b": ""})).unwrap();
    assert_eq!(outcome.not_completed().unwrap().kind, FailureKind::Fail);
  }

  #[test]
  fn test_matrix_shape_is_checked() {
    let err = DistanceMatrix::from_value(json!({"names": ["a", "b"], "dists": [[0.0]]}));
    assert!(err.is_err());
  }
}
