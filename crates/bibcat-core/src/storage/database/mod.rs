mod connection;
mod migrations;
mod schema;

pub use connection::ConnectionPool;
pub use migrations::{get_applied_versions, run_migrations, Migration};
pub use schema::SCHEMA_VERSION;

use std::path::Path;

use crate::error::{CatalogError, Result};
use crate::models::{Author, AuthorId, NewAuthor, Publication, PublicationFields, PublicationId};

use super::queries::{CatalogStats, CatalogStatsQuery};
use super::repositories::{
    AuthorRepository, PublicationRepository, Repository, SqliteAuthorRepository,
    SqlitePublicationRepository,
};
use super::store::CatalogStore;

pub fn open_database(path: &Path) -> Result<ConnectionPool> {
    let pool = ConnectionPool::open(path)?;
    {
        let conn = pool.get_connection();
        migrations::run_migrations(&conn)?;
    }
    Ok(pool)
}

pub fn open_in_memory() -> Result<ConnectionPool> {
    let pool = ConnectionPool::open_in_memory()?;
    {
        let conn = pool.get_connection();
        migrations::run_migrations(&conn)?;
    }
    Ok(pool)
}

/// SQLite-backed catalog.
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let pool = open_database(path)?;
        Ok(Self { pool })
    }

    pub fn open_in_memory() -> Result<Self> {
        let pool = open_in_memory()?;
        Ok(Self { pool })
    }

    pub fn path(&self) -> Option<&str> {
        self.pool.path()
    }

    fn authors(&self) -> SqliteAuthorRepository<'_> {
        SqliteAuthorRepository::new(self.pool.get_connection())
    }

    fn publications(&self) -> SqlitePublicationRepository<'_> {
        SqlitePublicationRepository::new(self.pool.get_connection())
    }

    pub fn get_publication(&self, id: PublicationId) -> Result<Publication> {
        self.publications()
            .find_by_id(&id)?
            .ok_or_else(|| CatalogError::PublicationNotFound(id.to_string()))
    }

    pub fn find_author_by_slug(&self, slug: &str) -> Result<Option<Author>> {
        self.authors().find_by_slug(slug)
    }

    pub fn count_publications(&self) -> Result<usize> {
        self.publications().count()
    }

    pub fn count_authors(&self) -> Result<usize> {
        self.authors().count()
    }

    pub fn applied_migrations(&self) -> Result<Vec<u32>> {
        get_applied_versions(&self.pool.get_connection())
    }

    pub fn stats(&self) -> Result<CatalogStats> {
        CatalogStatsQuery::new(self.pool.get_connection()).get_stats()
    }
}

impl CatalogStore for Database {
    fn find_publication_by_doi(&self, doi: &str) -> Result<Option<Publication>> {
        self.publications().find_by_doi(doi)
    }

    fn find_author_by_name(&self, name: &str) -> Result<Option<Author>> {
        self.authors().find_by_name(name)
    }

    fn create_or_update_publication(
        &mut self,
        existing: Option<PublicationId>,
        fields: &PublicationFields,
    ) -> Result<Publication> {
        let repo = self.publications();
        match existing {
            Some(id) => repo.update_fields(id, fields),
            None => repo.insert(fields),
        }
    }

    fn create_author(&mut self, author: &NewAuthor) -> Result<Author> {
        self.authors().insert(author)
    }

    fn set_author_h_index(&mut self, id: AuthorId, h_index: Option<i32>) -> Result<Author> {
        let repo = self.authors();
        let mut author = repo
            .find_by_id(&id)?
            .ok_or_else(|| CatalogError::AuthorNotFound(id.to_string()))?;
        author.h_index = h_index;
        repo.save(&author)?;
        Ok(author)
    }

    fn set_publication_authors(&mut self, publication: &Publication, authors: &[Author]) -> Result<()> {
        let ids: Vec<AuthorId> = authors.iter().map(|a| a.id).collect();
        self.publications().replace_authors(publication.id, &ids)
    }

    fn publication_authors(&self, publication: &Publication) -> Result<Vec<Author>> {
        self.publications().authors_of(publication.id)
    }

    fn slug_exists(&self, candidate: &str) -> Result<bool> {
        self.authors().slug_exists(candidate)
    }

    fn begin_unit(&mut self) -> Result<()> {
        self.pool.get_connection().execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn commit_unit(&mut self) -> Result<()> {
        self.pool.get_connection().execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback_unit(&mut self) -> Result<()> {
        let conn = self.pool.get_connection();
        if !conn.is_autocommit() {
            conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;

    fn fields(title: &str, doi: &str) -> PublicationFields {
        PublicationFields {
            title: title.to_string(),
            publication_date: NaiveDate::from_ymd_opt(2020, 1, 1),
            doi: Some(doi.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_open_on_disk_creates_parent_and_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("bibcat.db");

        {
            let mut db = Database::open(&path).unwrap();
            db.create_or_update_publication(None, &fields("A", "10.1/a")).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.count_publications().unwrap(), 1);
        assert!(db.find_publication_by_doi("10.1/a").unwrap().is_some());
    }

    #[test]
    fn test_rollback_discards_unit() {
        let mut db = Database::open_in_memory().unwrap();

        db.begin_unit().unwrap();
        let publication = db.create_or_update_publication(None, &fields("A", "10.1/a")).unwrap();
        let author = db.create_author(&NewAuthor::new("Doe, J", "doe-j")).unwrap();
        db.set_publication_authors(&publication, &[author]).unwrap();
        db.rollback_unit().unwrap();

        let stats = db.stats().unwrap();
        assert_eq!(stats, CatalogStats::default());
    }

    #[test]
    fn test_commit_keeps_unit() {
        let mut db = Database::open_in_memory().unwrap();

        db.begin_unit().unwrap();
        let publication = db.create_or_update_publication(None, &fields("A", "10.1/a")).unwrap();
        let author = db.create_author(&NewAuthor::new("Doe, J", "doe-j")).unwrap();
        db.set_publication_authors(&publication, &[author.clone()]).unwrap();
        db.commit_unit().unwrap();

        let stats = db.stats().unwrap();
        assert_eq!(stats.publications, 1);
        assert_eq!(stats.authors, 1);
        assert_eq!(stats.with_doi, 1);
        assert_eq!(stats.with_date, 1);
        assert_eq!(stats.authorships, 1);
        assert_eq!(db.publication_authors(&publication).unwrap(), vec![author]);
        assert_eq!(db.get_publication(publication.id).unwrap().title, "A");
    }

    #[test]
    fn test_rollback_outside_unit_is_noop() {
        let mut db = Database::open_in_memory().unwrap();
        db.rollback_unit().unwrap();
    }

    #[test]
    fn test_set_author_h_index() {
        let mut db = Database::open_in_memory().unwrap();
        let author = db.create_author(&NewAuthor::new("Doe, J", "doe-j")).unwrap();

        let updated = db.set_author_h_index(author.id, Some(9)).unwrap();
        assert_eq!(updated.h_index, Some(9));
        assert_eq!(db.find_author_by_slug("doe-j").unwrap().unwrap().h_index, Some(9));
        assert!(db.set_author_h_index(404, Some(1)).is_err());
    }
}
