//! Naive alignment.

use cogent_app::{AppDescriptor, AppError};

use crate::seqs::{SeqCollection, seqs_stage};

pub(crate) fn apps() -> Result<Vec<AppDescriptor>, AppError> {
  Ok(vec![pad_gaps()?])
}

/// Right-pads every sequence with gaps to the length of the longest one.
fn pad_gaps() -> Result<AppDescriptor, AppError> {
  AppDescriptor::builder("align.pad_gaps")
    .input("SequenceCollection")
    .output("Alignment")
    .description("align sequences by padding them with trailing gaps")
    .constructor(|_params| {
      Ok(seqs_stage(|mut seqs: SeqCollection| {
        let width = seqs.lengths().max().unwrap_or(0);
        for s in &mut seqs.seqs {
          let missing = width - s.seq.chars().count();
          s.seq.extend(std::iter::repeat_n('-', missing));
        }
        Ok(seqs)
      }))
    })
    .build()
}
