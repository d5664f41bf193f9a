use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use bibcat_core::{Author, CatalogStore, ImportConfig, NewAuthor, Publication, PublicationFields};
use tracing::{debug, error, info, warn};

use crate::dates::normalize_publication_date;
use crate::error::{IngestError, RecordError, Result};
use crate::formats::wos::{parse_wos, RawTaggedRecord, WosParse, WosParseOptions, WosReader};
use crate::slug::{RandomSuffix, SlugAllocator, SuffixSource};

use super::index::DoiIndex;
use super::summary::{ImportSummary, SkippedRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Created {
        publication: Publication,
        authors_created: usize,
    },
    Updated {
        publication: Publication,
        authors_created: usize,
    },
}

impl RecordOutcome {
    pub fn publication(&self) -> &Publication {
        match self {
            RecordOutcome::Created { publication, .. } | RecordOutcome::Updated { publication, .. } => {
                publication
            }
        }
    }

    fn authors_created(&self) -> usize {
        match self {
            RecordOutcome::Created { authors_created, .. }
            | RecordOutcome::Updated { authors_created, .. } => *authors_created,
        }
    }
}

/// Validates a parsed record and turns it into storable fields.
///
/// The title check runs before the date check, so a record failing both is
/// reported as missing its title. An empty `DI` value counts as no DOI.
pub fn publication_fields(record: &RawTaggedRecord) -> std::result::Result<PublicationFields, RecordError> {
    let title = record
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .ok_or(RecordError::MissingTitle)?;

    let date = normalize_publication_date(record.publication_date.as_deref().unwrap_or(""))?;

    Ok(PublicationFields {
        title: title.to_string(),
        source: record.source.clone(),
        publication_date: Some(date),
        volume: record.volume.clone(),
        issue: record.issue.clone(),
        pages: record.pages.clone(),
        doi: record
            .doi
            .as_deref()
            .map(str::trim)
            .filter(|doi| !doi.is_empty())
            .map(str::to_string),
    })
}

/// Reconciles tagged records against a catalog, one store unit per record.
pub struct Importer<'s, S: CatalogStore, G = RandomSuffix> {
    store: &'s mut S,
    slugs: SlugAllocator<G>,
    options: WosParseOptions,
    index: DoiIndex,
}

impl<'s, S: CatalogStore> Importer<'s, S> {
    pub fn new(store: &'s mut S, config: &ImportConfig) -> Self {
        Self::with_allocator(
            store,
            SlugAllocator::new(config.slug_max_attempts),
            WosParseOptions {
                continuation_lines: config.continuation_lines,
            },
        )
    }
}

impl<'s, S: CatalogStore, G: SuffixSource> Importer<'s, S, G> {
    pub fn with_allocator(store: &'s mut S, slugs: SlugAllocator<G>, options: WosParseOptions) -> Self {
        Self {
            store,
            slugs,
            options,
            index: DoiIndex::new(),
        }
    }

    /// Imports every record of a tagged export file.
    ///
    /// A missing file fails with [`IngestError::InputNotFound`] before the
    /// store is touched.
    pub fn import_file(&mut self, path: &Path) -> Result<ImportSummary> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => IngestError::InputNotFound(path.to_path_buf()),
            _ => IngestError::Io(e),
        })?;

        info!(path = %path.display(), "importing tagged records");
        let parse = WosReader::new(BufReader::new(file), self.options).collect_parse()?;
        self.import_parsed(parse)
    }

    pub fn import_str(&mut self, content: &str) -> Result<ImportSummary> {
        let parse = parse_wos(content, self.options);
        self.import_parsed(parse)
    }

    /// Processes records strictly in file order. Record-level failures are
    /// logged and collected; store failures abort the run.
    pub fn import_parsed(&mut self, parse: WosParse) -> Result<ImportSummary> {
        if let Some(line) = parse.dangling_line {
            warn!(line, "input ends inside a record with no ER marker; that record was dropped");
        }

        let total = parse.records.len();
        let mut summary = ImportSummary::new(total);
        summary.dangling_line = parse.dangling_line;

        for (position, record) in parse.records.iter().enumerate() {
            let index = position + 1;
            info!("Processing record {index}/{total}");

            match self.import_record(record) {
                Ok(outcome) => {
                    summary.authors_created += outcome.authors_created();
                    match outcome {
                        RecordOutcome::Created { .. } => summary.created += 1,
                        RecordOutcome::Updated { .. } => summary.updated += 1,
                    }
                }
                Err(IngestError::Record(reason)) => {
                    warn!(index, line = record.line, "Skipping record: {reason}");
                    summary.skipped.push(SkippedRecord {
                        index,
                        line: record.line,
                        reason,
                    });
                }
                Err(e) => {
                    error!(index, line = record.line, "import aborted: {e}");
                    return Err(e);
                }
            }
        }

        info!(
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped_count(),
            authors_created = summary.authors_created,
            "import finished"
        );
        Ok(summary)
    }

    /// Creates or updates the publication for one record and rewrites its
    /// author list, all inside one store unit.
    pub fn import_record(&mut self, record: &RawTaggedRecord) -> Result<RecordOutcome> {
        let fields = publication_fields(record)?;

        self.store.begin_unit()?;
        match self.apply(record, &fields) {
            Ok(outcome) => {
                self.store.commit_unit()?;
                self.index.remember(outcome.publication());
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback) = self.store.rollback_unit() {
                    error!("rollback failed: {rollback}");
                }
                Err(e)
            }
        }
    }

    fn apply(&mut self, record: &RawTaggedRecord, fields: &PublicationFields) -> Result<RecordOutcome> {
        let existing = match fields.doi.as_deref() {
            Some(doi) => self.index.lookup(&*self.store, doi)?,
            None => None,
        };
        let existing_id = existing.as_ref().map(|publication| publication.id);
        let publication = self.store.create_or_update_publication(existing_id, fields)?;

        let (authors, authors_created) = self.resolve_authors(&record.authors)?;
        self.store.set_publication_authors(&publication, &authors)?;

        Ok(match existing_id {
            Some(_) => RecordOutcome::Updated {
                publication,
                authors_created,
            },
            None => RecordOutcome::Created {
                publication,
                authors_created,
            },
        })
    }

    /// Looks authors up by exact name, creating the missing ones.
    fn resolve_authors(&mut self, names: &[String]) -> Result<(Vec<Author>, usize)> {
        let mut authors = Vec::with_capacity(names.len());
        let mut created = 0;

        for name in names {
            if name.is_empty() {
                debug!("ignoring empty author entry");
                continue;
            }

            let author = match self.store.find_author_by_name(name)? {
                Some(author) => author,
                None => {
                    let slug = self.slugs.allocate(&*self.store, name)?;
                    created += 1;
                    self.store.create_author(&NewAuthor::new(name.as_str(), slug))?
                }
            };
            authors.push(author);
        }

        Ok((authors, created))
    }
}
