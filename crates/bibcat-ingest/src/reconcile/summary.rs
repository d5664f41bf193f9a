use serde::{Serialize, Serializer};

use crate::error::RecordError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    /// 1-based position of the record in the file.
    pub index: usize,
    /// Line where the record starts.
    pub line: usize,
    #[serde(serialize_with = "display")]
    pub reason: RecordError,
}

fn display<S: Serializer>(reason: &RecordError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(reason)
}

/// Outcome of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub authors_created: usize,
    pub skipped: Vec<SkippedRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dangling_line: Option<usize>,
}

impl ImportSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn processed(&self) -> usize {
        self.created + self.updated
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}
