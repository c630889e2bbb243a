//! Sampling and filtering apps for sequence collections.

use std::collections::HashSet;

use cogent_app::{AppDescriptor, AppError, NotCompleted, ParamSpec};
use serde_json::json;

use crate::seqs::{SeqCollection, seqs_stage};

const SEQS: &str = "SeqsCollectionType";

/// Characters treated as unambiguous. Anything else is degenerate.
const CANONICAL: &[char] = &['A', 'C', 'G', 'T', 'U', '-'];

pub(crate) fn apps() -> Result<Vec<AppDescriptor>, AppError> {
  Ok(vec![
    min_length()?,
    fixed_length()?,
    take_n_seqs()?,
    take_named_seqs()?,
    omit_duplicated()?,
    omit_degenerates()?,
  ])
}

fn min_length() -> Result<AppDescriptor, AppError> {
  AppDescriptor::builder("sample.min_length")
    .input(SEQS)
    .output(SEQS)
    .param(ParamSpec::required("length").describe("minimum sequence length"))
    .description("fail collections containing a sequence shorter than length")
    .constructor(|params| {
      let length: usize = params.get_as("length")?;
      Ok(seqs_stage(move |seqs| {
        let shortest = seqs.lengths().min();
        match shortest {
          Some(shortest) if shortest < length => Err(NotCompleted::fail(format!(
            "{} < min_length {}",
            shortest, length
          ))),
          _ => Ok(seqs),
        }
      }))
    })
    .build()
}

fn fixed_length() -> Result<AppDescriptor, AppError> {
  AppDescriptor::builder("sample.fixed_length")
    .input(SEQS)
    .output(SEQS)
    .param(ParamSpec::required("length").describe("length to truncate to"))
    .description("truncate every sequence to length")
    .constructor(|params| {
      let length: usize = params.get_as("length")?;
      Ok(seqs_stage(move |mut seqs: SeqCollection| {
        let shortest = seqs.lengths().min();
        if let Some(shortest) = shortest
          && shortest < length
        {
          return Err(NotCompleted::fail(format!(
            "{} < fixed_length {}",
            shortest, length
          )));
        }
        for s in &mut seqs.seqs {
          s.seq = s.seq.chars().take(length).collect();
        }
        Ok(seqs)
      }))
    })
    .build()
}

fn take_n_seqs() -> Result<AppDescriptor, AppError> {
  AppDescriptor::builder("sample.take_n_seqs")
    .input(SEQS)
    .output(SEQS)
    .param(ParamSpec::required("number").describe("number of sequences to keep"))
    .description("keep the first number sequences")
    .constructor(|params| {
      let number: usize = params.get_as("number")?;
      Ok(seqs_stage(move |mut seqs: SeqCollection| {
        if seqs.len() < number {
          return Err(NotCompleted::fail(format!(
            "{} < take_n_seqs {}",
            seqs.len(),
            number
          )));
        }
        seqs.seqs.truncate(number);
        Ok(seqs)
      }))
    })
    .build()
}

fn take_named_seqs() -> Result<AppDescriptor, AppError> {
  AppDescriptor::builder("sample.take_named_seqs")
    .input(SEQS)
    .output(SEQS)
    .param(ParamSpec::required("names").describe("names of the sequences to keep"))
    .description("keep only the named sequences")
    .constructor(|params| {
      let names: Vec<String> = params.get_as("names")?;
      Ok(seqs_stage(move |mut seqs: SeqCollection| {
        let missing: Vec<&str> = names
          .iter()
          .filter(|n| !seqs.seqs.iter().any(|s| &s.name == *n))
          .map(String::as_str)
          .collect();
        if !missing.is_empty() {
          return Err(NotCompleted::fail(format!(
            "named seqs not present: {}",
            missing.join(", ")
          )));
        }
        seqs.seqs.retain(|s| names.contains(&s.name));
        Ok(seqs)
      }))
    })
    .build()
}

fn omit_duplicated() -> Result<AppDescriptor, AppError> {
  AppDescriptor::builder("sample.omit_duplicated")
    .input(SEQS)
    .output(SEQS)
    .description("drop sequences identical to an earlier one")
    .constructor(|_params| {
      Ok(seqs_stage(|mut seqs: SeqCollection| {
        let mut seen = HashSet::new();
        seqs.seqs.retain(|s| seen.insert(s.seq.to_ascii_uppercase()));
        Ok(seqs)
      }))
    })
    .build()
}

fn omit_degenerates() -> Result<AppDescriptor, AppError> {
  AppDescriptor::builder("sample.omit_degenerates")
    .input(SEQS)
    .output(SEQS)
    .param(
      ParamSpec::optional("gap_is_degenerate", json!(false))
        .describe("treat '-' as a degenerate character"),
    )
    .description(
      "drop alignment columns containing degenerate characters, or strip them from unaligned sequences",
    )
    .constructor(|params| {
      let gap_is_degenerate: bool = params.get_as("gap_is_degenerate")?;
      Ok(seqs_stage(move |seqs| {
        Ok(omit_degenerate(seqs, gap_is_degenerate))
      }))
    })
    .build()
}

fn omit_degenerate(mut seqs: SeqCollection, gap_is_degenerate: bool) -> SeqCollection {
  let canonical = |c: char| {
    let c = c.to_ascii_uppercase();
    CANONICAL.contains(&c) && !(gap_is_degenerate && c == '-')
  };

  if !seqs.is_aligned() {
    for s in &mut seqs.seqs {
      s.seq.retain(&canonical);
    }
    return seqs;
  }

  let rows: Vec<Vec<char>> = seqs.seqs.iter().map(|s| s.seq.chars().collect()).collect();
  let width = rows.first().map_or(0, Vec::len);
  let keep: Vec<bool> = (0..width)
    .map(|col| rows.iter().all(|row| canonical(row[col])))
    .collect();

  for (s, row) in seqs.seqs.iter_mut().zip(rows) {
    s.seq = row
      .into_iter()
      .zip(&keep)
      .filter_map(|(c, keep)| keep.then_some(c))
      .collect();
  }
  seqs
}
