//! Web of Science import pipeline: tagged-record parsing, date and slug
//! normalization, and reconciliation against a [`bibcat_core::CatalogStore`].

pub mod dates;
pub mod error;
pub mod formats;
pub mod h_index;
pub mod reconcile;
pub mod slug;

pub use dates::normalize_publication_date;
pub use error::{IngestError, RecordError, Result};
pub use formats::{parse_wos, RawTaggedRecord, WosParse, WosParseOptions, WosReader};
pub use h_index::{import_h_index, import_h_index_file, HIndexSummary};
pub use reconcile::{publication_fields, DoiIndex, ImportSummary, Importer, RecordOutcome, SkippedRecord};
pub use slug::{slugify, RandomSuffix, SlugAllocator, SuffixSource};
