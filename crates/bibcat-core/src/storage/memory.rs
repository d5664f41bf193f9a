use std::collections::HashMap;

use crate::error::{CatalogError, Result};
use crate::models::{Author, AuthorId, NewAuthor, Publication, PublicationFields, PublicationId};

use super::store::CatalogStore;

#[derive(Debug, Clone, Default)]
struct State {
    authors: Vec<Author>,
    publications: Vec<Publication>,
    links: HashMap<PublicationId, Vec<AuthorId>>,
    next_author_id: AuthorId,
    next_publication_id: PublicationId,
}

/// In-memory `CatalogStore` with the same uniqueness rules as the SQLite
/// schema. A unit snapshots the whole state and restores it on rollback.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: State,
    snapshot: Option<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publications(&self) -> &[Publication] {
        &self.state.publications
    }

    pub fn authors(&self) -> &[Author] {
        &self.state.authors
    }

    pub fn in_unit(&self) -> bool {
        self.snapshot.is_some()
    }
}

impl CatalogStore for MemoryStore {
    fn find_publication_by_doi(&self, doi: &str) -> Result<Option<Publication>> {
        Ok(self
            .state
            .publications
            .iter()
            .find(|p| p.doi.as_deref() == Some(doi))
            .cloned())
    }

    fn find_author_by_name(&self, name: &str) -> Result<Option<Author>> {
        Ok(self.state.authors.iter().find(|a| a.name == name).cloned())
    }

    fn create_or_update_publication(
        &mut self,
        existing: Option<PublicationId>,
        fields: &PublicationFields,
    ) -> Result<Publication> {
        fields.validate()?;

        if let Some(id) = existing {
            let publication = self
                .state
                .publications
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| CatalogError::PublicationNotFound(id.to_string()))?;
            publication.apply_fields(fields);
            return Ok(publication.clone());
        }

        if let Some(doi) = fields.doi.as_deref()
            && self.find_publication_by_doi(doi)?.is_some()
        {
            return Err(CatalogError::Conflict(format!(
                "publication doi {doi:?} already exists"
            )));
        }

        self.state.next_publication_id += 1;
        let publication = Publication::from_fields(self.state.next_publication_id, fields);
        self.state.publications.push(publication.clone());
        Ok(publication)
    }

    fn create_author(&mut self, author: &NewAuthor) -> Result<Author> {
        let taken = self
            .state
            .authors
            .iter()
            .any(|a| a.name == author.name || a.slug == author.slug);
        if taken {
            return Err(CatalogError::Conflict(format!(
                "author {:?} / slug {:?} already exists",
                author.name, author.slug
            )));
        }

        self.state.next_author_id += 1;
        let created = author.clone().into_author(self.state.next_author_id);
        self.state.authors.push(created.clone());
        Ok(created)
    }

    fn set_author_h_index(&mut self, id: AuthorId, h_index: Option<i32>) -> Result<Author> {
        let author = self
            .state
            .authors
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| CatalogError::AuthorNotFound(id.to_string()))?;
        author.h_index = h_index;
        Ok(author.clone())
    }

    fn set_publication_authors(&mut self, publication: &Publication, authors: &[Author]) -> Result<()> {
        if !self.state.publications.iter().any(|p| p.id == publication.id) {
            return Err(CatalogError::PublicationNotFound(publication.id.to_string()));
        }

        let mut ids: Vec<AuthorId> = Vec::with_capacity(authors.len());
        for author in authors {
            if !ids.contains(&author.id) {
                ids.push(author.id);
            }
        }
        self.state.links.insert(publication.id, ids);
        Ok(())
    }

    fn publication_authors(&self, publication: &Publication) -> Result<Vec<Author>> {
        let Some(ids) = self.state.links.get(&publication.id) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| self.state.authors.iter().find(|a| a.id == *id).cloned())
            .collect())
    }

    fn slug_exists(&self, candidate: &str) -> Result<bool> {
        Ok(self.state.authors.iter().any(|a| a.slug == candidate))
    }

    fn begin_unit(&mut self) -> Result<()> {
        if self.snapshot.is_some() {
            return Err(CatalogError::Validation("unit already open".to_string()));
        }
        self.snapshot = Some(self.state.clone());
        Ok(())
    }

    fn commit_unit(&mut self) -> Result<()> {
        self.snapshot = None;
        Ok(())
    }

    fn rollback_unit(&mut self) -> Result<()> {
        if let Some(snapshot) = self.snapshot.take() {
            self.state = snapshot;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(doi: Option<&str>) -> PublicationFields {
        PublicationFields {
            title: "Title".to_string(),
            doi: doi.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_unique_doi_and_author_rules() {
        let mut store = MemoryStore::new();
        store.create_or_update_publication(None, &fields(Some("10.1/a"))).unwrap();
        assert!(matches!(
            store.create_or_update_publication(None, &fields(Some("10.1/a"))),
            Err(CatalogError::Conflict(_))
        ));
        store.create_or_update_publication(None, &fields(None)).unwrap();
        store.create_or_update_publication(None, &fields(None)).unwrap();
        assert_eq!(store.publications().len(), 3);

        store.create_author(&NewAuthor::new("Doe, J", "doe-j")).unwrap();
        assert!(store.create_author(&NewAuthor::new("Doe, J", "doe-j-2")).is_err());
        assert!(store.create_author(&NewAuthor::new("Doe J", "doe-j")).is_err());
    }

    #[test]
    fn test_rollback_restores_snapshot() {
        let mut store = MemoryStore::new();
        store.create_author(&NewAuthor::new("Kept", "kept")).unwrap();

        store.begin_unit().unwrap();
        assert!(store.in_unit());
        store.create_author(&NewAuthor::new("Dropped", "dropped")).unwrap();
        store.create_or_update_publication(None, &fields(Some("10.1/a"))).unwrap();
        store.rollback_unit().unwrap();

        assert!(!store.in_unit());
        assert_eq!(store.authors().len(), 1);
        assert!(store.publications().is_empty());
        assert!(!store.slug_exists("dropped").unwrap());
    }

    #[test]
    fn test_publication_authors_dedupes_and_orders() {
        let mut store = MemoryStore::new();
        let publication = store.create_or_update_publication(None, &fields(None)).unwrap();
        let a = store.create_author(&NewAuthor::new("A", "a")).unwrap();
        let b = store.create_author(&NewAuthor::new("B", "b")).unwrap();

        store
            .set_publication_authors(&publication, &[b.clone(), a.clone(), b.clone()])
            .unwrap();
        assert_eq!(store.publication_authors(&publication).unwrap(), vec![b, a]);
    }
}
