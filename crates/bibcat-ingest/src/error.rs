use std::path::PathBuf;

use bibcat_core::CatalogError;
use thiserror::Error;

/// Errors raised while importing. `Record` rejects only the record being
/// processed; every other variant aborts the run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Reasons a single record is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record has no title")]
    MissingTitle,

    #[error("invalid publication date: {raw:?}")]
    InvalidDate { raw: String },

    #[error("no free slug for author {name:?} after {attempts} attempts")]
    SlugAllocation { name: String, attempts: u32 },
}

pub type Result<T> = std::result::Result<T, IngestError>;
