//! Bulk h-index import from a `name,h_index` CSV export.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use bibcat_core::{CatalogStore, NewAuthor};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{IngestError, Result};
use crate::slug::{SlugAllocator, SuffixSource};

#[derive(Debug, Deserialize)]
struct HIndexRow {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    h_index: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HIndexSummary {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Parses an h-index cell. Only plain ASCII digits count.
fn parse_h_index(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Applies every row to the catalog.
///
/// Rows with an empty name or no `h_index` column value are skipped. A new
/// author gets the parsed value, or 0 when it is not a number; an existing
/// author is only touched when the value is numeric. Each row is its own
/// store unit.
pub fn import_h_index<R, S, G>(store: &mut S, slugs: &mut SlugAllocator<G>, reader: R) -> Result<HIndexSummary>
where
    R: Read,
    S: CatalogStore + ?Sized,
    G: SuffixSource,
{
    let mut csv = csv::ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_reader(reader);
    let mut summary = HIndexSummary::default();

    for (position, row) in csv.deserialize::<HIndexRow>().enumerate() {
        let row = row?;
        summary.total += 1;
        let index = position + 1;

        let name = row.name.as_deref().unwrap_or("");
        let Some(raw) = row.h_index.as_deref().filter(|_| !name.is_empty()) else {
            warn!(index, "Skipping h-index row without name or value");
            summary.skipped += 1;
            continue;
        };
        let value = parse_h_index(raw);

        match store.find_author_by_name(name)? {
            Some(author) => match value {
                Some(h) => {
                    store.set_author_h_index(author.id, Some(h))?;
                    summary.updated += 1;
                }
                None => {
                    warn!(index, name, raw, "Ignoring non-numeric h-index");
                    summary.skipped += 1;
                }
            },
            None => {
                store.begin_unit()?;
                let created = slugs
                    .allocate(&*store, name)
                    .and_then(|slug| {
                        let author = NewAuthor::new(name, slug).with_h_index(value.unwrap_or(0));
                        Ok(store.create_author(&author)?)
                    });
                match created {
                    Ok(_) => {
                        store.commit_unit()?;
                        summary.created += 1;
                    }
                    Err(e) => {
                        store.rollback_unit()?;
                        match e {
                            IngestError::Record(reason) => {
                                warn!(index, name, "Skipping h-index row: {reason}");
                                summary.skipped += 1;
                            }
                            other => return Err(other),
                        }
                    }
                }
            }
        }
    }

    info!(
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped,
        "h-index import finished"
    );
    Ok(summary)
}

pub fn import_h_index_file<S, G>(store: &mut S, slugs: &mut SlugAllocator<G>, path: &Path) -> Result<HIndexSummary>
where
    S: CatalogStore + ?Sized,
    G: SuffixSource,
{
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => IngestError::InputNotFound(path.to_path_buf()),
        _ => IngestError::Io(e),
    })?;
    info!(path = %path.display(), "importing h-index values");
    import_h_index(store, slugs, file)
}
