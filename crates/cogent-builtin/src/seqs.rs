//! Sequence collection payloads.
//!
//! On the wire a collection is a JSON object mapping sequence names to
//! sequence strings. Sequences are kept in key order.

use std::collections::HashSet;

use cogent_app::{AppError, AppFunction, NotCompleted, Outcome};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Seq {
  pub name: String,
  pub seq: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SeqCollection {
  pub seqs: Vec<Seq>,
}

impl SeqCollection {
  pub fn from_value(value: &Value) -> Result<Self, NotCompleted> {
    let object = value
      .as_object()
      .ok_or_else(|| NotCompleted::error("expected a sequence collection object"))?;

    let mut seqs = Vec::with_capacity(object.len());
    for (name, seq) in object {
      let seq = seq.as_str().ok_or_else(|| {
        NotCompleted::error(format!("sequence '{}' is not a string", name))
      })?;
      seqs.push(Seq {
        name: name.clone(),
        seq: seq.to_string(),
      });
    }
    Ok(Self { seqs })
  }

  pub fn into_value(self) -> Value {
    let map: Map<String, Value> = self
      .seqs
      .into_iter()
      .map(|s| (s.name, Value::String(s.seq)))
      .collect();
    Value::Object(map)
  }

  /// Parse FASTA text. Sequence lines are concatenated and whitespace is
  /// dropped. Labels must be unique.
  pub fn from_fasta(text: &str) -> Result<Self, String> {
    let mut seqs: Vec<Seq> = Vec::new();
    let mut labels = HashSet::new();

    for (number, line) in text.lines().enumerate() {
      let line = line.trim();
      if line.is_empty() {
        continue;
      }
      if let Some(label) = line.strip_prefix('>') {
        let name = label.split_whitespace().next().unwrap_or_default();
        if name.is_empty() {
          return Err(format!("line {}: empty sequence label", number + 1));
        }
        if !labels.insert(name) {
          return Err(format!(
            "line {}: duplicate sequence label '{}'",
            number + 1,
            name
          ));
        }
        seqs.push(Seq {
          name: name.to_string(),
          seq: String::new(),
        });
      } else {
        match seqs.last_mut() {
          Some(last) => last.seq.extend(line.chars().filter(|c| !c.is_whitespace())),
          None => return Err(format!("line {}: sequence data before first label", number + 1)),
        }
      }
    }

    if seqs.is_empty() {
      return Err("no sequences found".to_string());
    }
    Ok(Self { seqs })
  }

  pub fn to_fasta(&self) -> String {
    let mut out = String::new();
    for s in &self.seqs {
      out.push('>');
      out.push_str(&s.name);
      out.push('\n');
      let chars: Vec<char> = s.seq.chars().collect();
      for line in chars.chunks(60) {
        out.extend(line);
        out.push('\n');
      }
    }
    out
  }

  pub fn len(&self) -> usize {
    self.seqs.len()
  }

  pub fn lengths(&self) -> impl Iterator<Item = usize> + '_ {
    self.seqs.iter().map(|s| s.seq.chars().count())
  }

  /// Whether every sequence has the same length.
  pub fn is_aligned(&self) -> bool {
    let mut lengths = self.lengths();
    match lengths.next() {
      Some(first) => lengths.all(|l| l == first),
      None => true,
    }
  }
}

/// Wrap a collection-to-collection step as an app function. Inputs that are
/// not collections become `NotCompleted` errors.
pub(crate) fn seqs_stage<F>(f: F) -> Box<dyn AppFunction>
where
  F: Fn(SeqCollection) -> Result<SeqCollection, NotCompleted> + Send + Sync + 'static,
{
  Box::new(move |value: Value| -> Result<Outcome, AppError> {
    let result = SeqCollection::from_value(&value).and_then(&f);
    Ok(match result {
      Ok(seqs) => Outcome::Completed(seqs.into_value()),
      Err(nc) => Outcome::NotCompleted(nc),
    })
  })
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_fasta_roundtrip() {
    let text = ">human some description\nACGT\nAC\n\n>mouse\nACGTTT\n";
    let seqs = SeqCollection::from_fasta(text).unwrap();
    assert_eq!(seqs.len(), 2);
    assert_eq!(seqs.seqs[0].name, "human");
    assert_eq!(seqs.seqs[0].seq, "ACGTAC");
    assert_eq!(seqs.to_fasta(), ">human\nACGTAC\n>mouse\nACGTTT\n");
  }

  #[test]
  fn test_fasta_rejects_orphan_sequence() {
    assert!(SeqCollection::from_fasta("ACGT\n>a\nAC").is_err());
    assert!(SeqCollection::from_fasta("").is_err());
  }

  #[test]
  fn test_fasta_rejects_duplicate_labels() {
    let err = SeqCollection::from_fasta(">a\nAAAA\n>a\nCCCC\n>b\nGGGG\n").unwrap_err();
    assert_eq!(err, "line 3: duplicate sequence label 'a'");
  }

  #[test]
  fn test_to_fasta_wraps_by_character() {
    let seq = format!("{}éC", "A".repeat(59));
    let seqs = SeqCollection {
      seqs: vec![Seq {
        name: "x".to_string(),
        seq,
      }],
    };
    let expected = format!(">x\n{}é\nC\n", "A".repeat(59));
    assert_eq!(seqs.to_fasta(), expected);
  }

  #[test]
  fn test_from_value_rejects_non_strings() {
    let err = SeqCollection::from_value(&json!({"a": 1})).unwrap_err();
    assert!(err.message.contains("'a'"));
    assert!(SeqCollection::from_value(&json!("ACGT")).is_err());
  }

  #[test]
  fn test_is_aligned() {
    let seqs = SeqCollection::from_value(&json!({"a": "AC-T", "b": "ACGT"})).unwrap();
    assert!(seqs.is_aligned());
    let seqs = SeqCollection::from_value(&json!({"a": "AC", "b": "ACGT"})).unwrap();
    assert!(!seqs.is_aligned());
  }
}
