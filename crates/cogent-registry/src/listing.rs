//! Tabular listing of available apps.

use std::fmt;
use std::sync::Arc;

use cogent_app::{AppDescriptor, Role};
use serde::Serialize;

/// One row of an [`AppListing`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppRow {
  pub name: String,
  pub role: Role,
  pub accepted: Vec<String>,
  pub produced: Vec<String>,
  #[serde(skip_serializing_if = "String::is_empty")]
  pub description: String,
}

impl AppRow {
  fn from_descriptor(d: &AppDescriptor) -> Self {
    Self {
      name: d.qualified_name(),
      role: d.role(),
      accepted: d.data_types().iter().map(|t| t.to_string()).collect(),
      produced: d.return_types().iter().map(|t| t.to_string()).collect(),
      description: d.description().to_string(),
    }
  }
}

/// Apps with their composable role and type contracts.
///
/// `Display` renders a plain text table; the listing also serialises to JSON
/// as an array of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AppListing {
  rows: Vec<AppRow>,
}

impl AppListing {
  pub fn from_descriptors(descriptors: &[Arc<AppDescriptor>]) -> Self {
    Self {
      rows: descriptors
        .iter()
        .map(|d| AppRow::from_descriptor(d))
        .collect(),
    }
  }

  pub fn rows(&self) -> &[AppRow] {
    &self.rows
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  /// Values of the `name` column.
  pub fn names(&self) -> Vec<&str> {
    self.rows.iter().map(|r| r.name.as_str()).collect()
  }
}

const HEADERS: [&str; 4] = ["name", "role", "accepted types", "produced types"];

impl fmt::Display for AppListing {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let cells: Vec<[String; 4]> = self
      .rows
      .iter()
      .map(|r| {
        [
          r.name.clone(),
          r.role.to_string(),
          r.accepted.join(", "),
          r.produced.join(", "),
        ]
      })
      .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
      for (width, cell) in widths.iter_mut().zip(row) {
        *width = (*width).max(cell.len());
      }
    }

    let header: [String; 4] = HEADERS.map(str::to_string);
    write_row(f, &header, &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(f, "{}", rule.join("  "))?;
    for row in &cells {
      write_row(f, row, &widths)?;
    }
    Ok(())
  }
}

fn write_row(f: &mut fmt::Formatter<'_>, row: &[String; 4], widths: &[usize; 4]) -> fmt::Result {
  let padded: Vec<String> = row
    .iter()
    .zip(widths)
    .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
    .collect();
  writeln!(f, "{}", padded.join("  ").trim_end())
}

#[cfg(test)]
mod tests {
  use cogent_app::{Outcome, Role};
  use serde_json::Value;

  use super::*;

  fn listing() -> AppListing {
    let load = AppDescriptor::builder("io.load_fasta")
      .role(Role::Loader)
      .input("IdentifierType")
      .output("SequenceCollection")
      .function(|v: Value| Ok(Outcome::Completed(v)))
      .build()
      .unwrap();
    let dist = AppDescriptor::builder("dist.hamming")
      .input("Alignment")
      .output("DistanceMatrix")
      .function(|v: Value| Ok(Outcome::Completed(v)))
      .build()
      .unwrap();
    AppListing::from_descriptors(&[Arc::new(load), Arc::new(dist)])
  }

  #[test]
  fn test_table_has_columns() {
    let text = listing().to_string();
    let mut lines = text.lines();
    let header = lines.next().unwrap();
    for column in HEADERS {
      assert!(header.contains(column));
    }
    assert!(text.contains("io.load_fasta  loader"));
    assert!(text.contains("DistanceMatrix"));
    assert_eq!(text.lines().count(), 4);
  }

  #[test]
  fn test_json_rows() {
    let json = serde_json::to_value(listing()).unwrap();
    assert_eq!(json[0]["name"], "io.load_fasta");
    assert_eq!(json[0]["role"], "loader");
    assert_eq!(json[1]["accepted"][0], "Alignment");
  }
}
