mod engine;
mod index;
mod summary;

pub use engine::{publication_fields, Importer, RecordOutcome};
pub use index::DoiIndex;
pub use summary::{ImportSummary, SkippedRecord};
