//! Tree building from distance matrices.

use cogent_app::{AppDescriptor, AppError, NotCompleted, Outcome};
use serde_json::Value;

use crate::dist::DistanceMatrix;

pub(crate) fn apps() -> Result<Vec<AppDescriptor>, AppError> {
  Ok(vec![quick_tree()?])
}

fn quick_tree() -> Result<AppDescriptor, AppError> {
  AppDescriptor::builder("tree.quick_tree")
    .input("DistanceMatrix")
    .output("Tree")
    .description("UPGMA tree from a distance matrix, as Newick")
    .function(|value: Value| {
      Ok(match DistanceMatrix::from_value(value).and_then(upgma) {
        Ok(newick) => Outcome::Completed(Value::String(newick)),
        Err(nc) => nc.into(),
      })
    })
    .build()
}

struct Cluster {
  newick: String,
  height: f64,
  size: usize,
}

/// Average-linkage clustering. Ties merge the lowest-indexed pair first.
fn upgma(matrix: DistanceMatrix) -> Result<String, NotCompleted> {
  if matrix.names.len() < 2 {
    return Err(NotCompleted::fail("need at least 2 sequences to build a tree"));
  }

  let mut clusters: Vec<Cluster> = matrix
    .names
    .into_iter()
    .map(|name| Cluster {
      newick: name,
      height: 0.0,
      size: 1,
    })
    .collect();
  let mut dists = matrix.dists;

  while clusters.len() > 1 {
    let (mut bi, mut bj) = (0, 1);
    for i in 0..clusters.len() {
      for j in (i + 1)..clusters.len() {
        if dists[i][j] < dists[bi][bj] {
          (bi, bj) = (i, j);
        }
      }
    }

    let height = dists[bi][bj] / 2.0;
    // bj > bi, so removing bj first leaves bi in place.
    let right = clusters.remove(bj);
    let left = clusters.remove(bi);
    let right_row = dists.remove(bj);
    let left_row = dists.remove(bi);
    for row in &mut dists {
      row.remove(bj);
      row.remove(bi);
    }

    let total = (left.size + right.size) as f64;
    let mut merged_row: Vec<f64> = (0..clusters.len())
      .map(|k| {
        // Rows lost the two merged columns; map k back to the original index.
        let orig = original_index(k, bi, bj);
        (left_row[orig] * left.size as f64 + right_row[orig] * right.size as f64) / total
      })
      .collect();

    for (row, d) in dists.iter_mut().zip(&merged_row) {
      row.push(*d);
    }
    merged_row.push(0.0);
    dists.push(merged_row);

    clusters.push(Cluster {
      newick: format!(
        "({}:{},{}:{})",
        left.newick,
        branch(height - left.height),
        right.newick,
        branch(height - right.height)
      ),
      height,
      size: left.size + right.size,
    });
  }

  let root = clusters.remove(0);
  Ok(format!("{};", root.newick))
}

/// Index in the pre-merge matrix of the k-th remaining cluster.
fn original_index(k: usize, bi: usize, bj: usize) -> usize {
  let mut orig = k;
  if orig >= bi {
    orig += 1;
  }
  if orig >= bj {
    orig += 1;
  }
  orig
}

fn branch(length: f64) -> String {
  let rounded = format!("{:.6}", length.max(0.0));
  rounded
    .trim_end_matches('0')
    .trim_end_matches('.')
    .to_string()
}
