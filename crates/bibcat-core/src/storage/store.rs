//! The persistence seam the import engine is written against.
//!
//! `Database` is the production implementation; `MemoryStore` backs tests.
//! Writes between `begin_unit` and `commit_unit` must become visible to
//! other readers all at once or not at all.

use crate::error::Result;
use crate::models::{Author, AuthorId, NewAuthor, Publication, PublicationFields, PublicationId};

pub trait CatalogStore {
    fn find_publication_by_doi(&self, doi: &str) -> Result<Option<Publication>>;

    /// Exact, case-sensitive name match.
    fn find_author_by_name(&self, name: &str) -> Result<Option<Author>>;

    /// Overwrites the import-owned fields of `existing`, or inserts a new
    /// publication with every other column at its default.
    fn create_or_update_publication(
        &mut self,
        existing: Option<PublicationId>,
        fields: &PublicationFields,
    ) -> Result<Publication>;

    fn create_author(&mut self, author: &NewAuthor) -> Result<Author>;

    fn set_author_h_index(&mut self, id: AuthorId, h_index: Option<i32>) -> Result<Author>;

    /// Replaces the whole author list of `publication`; order is kept and
    /// repeated authors are linked once.
    fn set_publication_authors(&mut self, publication: &Publication, authors: &[Author]) -> Result<()>;

    fn publication_authors(&self, publication: &Publication) -> Result<Vec<Author>>;

    fn slug_exists(&self, candidate: &str) -> Result<bool>;

    fn begin_unit(&mut self) -> Result<()>;
    fn commit_unit(&mut self) -> Result<()>;
    fn rollback_unit(&mut self) -> Result<()>;
}
