use std::collections::HashMap;

use bibcat_core::{CatalogStore, Publication};

use crate::error::Result;

/// DOI → publication cache carried through one import run.
///
/// Misses fall through to the store; committed writes are recorded right
/// away so a later record with the same DOI sees them.
#[derive(Debug, Default)]
pub struct DoiIndex {
    entries: HashMap<String, Publication>,
}

impl DoiIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup<S: CatalogStore + ?Sized>(&mut self, store: &S, doi: &str) -> Result<Option<Publication>> {
        if let Some(publication) = self.entries.get(doi) {
            return Ok(Some(publication.clone()));
        }

        let found = store.find_publication_by_doi(doi)?;
        if let Some(publication) = &found {
            self.entries.insert(doi.to_string(), publication.clone());
        }
        Ok(found)
    }

    pub fn remember(&mut self, publication: &Publication) {
        if let Some(doi) = &publication.doi {
            self.entries.insert(doi.clone(), publication.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use bibcat_core::{MemoryStore, PublicationFields};

    use super::*;

    fn fields(title: &str) -> PublicationFields {
        PublicationFields {
            title: title.to_string(),
            doi: Some("10.1/a".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn miss_then_store_hit_is_cached() {
        let mut store = MemoryStore::new();
        let mut index = DoiIndex::new();
        assert!(index.lookup(&store, "10.1/a").unwrap().is_none());
        assert!(index.is_empty());

        store.create_or_update_publication(None, &fields("A")).unwrap();
        let found = index.lookup(&store, "10.1/a").unwrap().unwrap();
        assert_eq!(found.title, "A");
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn remembered_write_wins_over_stale_entry() {
        let mut store = MemoryStore::new();
        let created = store.create_or_update_publication(None, &fields("A")).unwrap();
        let mut index = DoiIndex::new();
        index.lookup(&store, "10.1/a").unwrap();

        let updated = store
            .create_or_update_publication(Some(created.id), &fields("B"))
            .unwrap();
        index.remember(&updated);

        assert_eq!(index.lookup(&store, "10.1/a").unwrap().unwrap().title, "B");
    }

    #[test]
    fn publications_without_doi_are_not_indexed() {
        let mut store = MemoryStore::new();
        let publication = store
            .create_or_update_publication(
                None,
                &PublicationFields {
                    title: "No DOI".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();

        let mut index = DoiIndex::new();
        index.remember(&publication);
        assert!(index.is_empty());
    }
}
