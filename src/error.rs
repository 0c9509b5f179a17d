use std::path::PathBuf;
use thiserror::Error;

/// Conditions that abort a collation run before any aggregation.
#[derive(Debug, Error)]
pub enum CollateError {
    #[error("no JSON files found in the input folder: {}", dir.display())]
    NoInputFiles { dir: PathBuf },
}

/// Cross-checks over the combined aggregation that guard against dropped or
/// double-counted tickets.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error(
        "total tickets ({total}) do not match the sum of program area tickets ({program_area}) and spam tickets ({spam})"
    )]
    TotalMismatch {
        total: usize,
        program_area: usize,
        spam: usize,
    },

    #[error("all tickets are considered spam ({spam} out of {total})")]
    AllSpam { spam: usize, total: usize },
}
