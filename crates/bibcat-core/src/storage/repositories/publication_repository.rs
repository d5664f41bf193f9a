use rusqlite::{params, Connection, OptionalExtension};
use std::sync::MutexGuard;

use crate::error::{CatalogError, Result};
use crate::models::{Author, AuthorId, Publication, PublicationFields, PublicationId};

use super::Repository;

pub trait PublicationRepository: Repository<Entity = Publication, Id = PublicationId> {
    fn find_by_doi(&self, doi: &str) -> Result<Option<Publication>>;
    fn insert(&self, fields: &PublicationFields) -> Result<Publication>;
    fn update_fields(&self, id: PublicationId, fields: &PublicationFields) -> Result<Publication>;
    fn authors_of(&self, id: PublicationId) -> Result<Vec<Author>>;
    fn replace_authors(&self, id: PublicationId, author_ids: &[AuthorId]) -> Result<()>;
    fn count(&self) -> Result<usize>;
}

pub struct SqlitePublicationRepository<'a> {
    conn: MutexGuard<'a, Connection>,
}

const PUBLICATION_COLUMNS: &str = "id, title, source, language, document_type, publication_date,
     volume, issue, pages, doi, wos_id, category, citations";

impl<'a> SqlitePublicationRepository<'a> {
    pub fn new(conn: MutexGuard<'a, Connection>) -> Self {
        Self { conn }
    }

    fn row_to_publication(row: &rusqlite::Row) -> rusqlite::Result<Publication> {
        Ok(Publication {
            id: row.get(0)?,
            title: row.get(1)?,
            source: row.get(2)?,
            language: row.get(3)?,
            document_type: row.get(4)?,
            publication_date: row.get(5)?,
            volume: row.get(6)?,
            issue: row.get(7)?,
            pages: row.get(8)?,
            doi: row.get(9)?,
            wos_id: row.get(10)?,
            category: row.get(11)?,
            citations: row.get(12)?,
        })
    }
}

impl<'a> Repository for SqlitePublicationRepository<'a> {
    type Entity = Publication;
    type Id = PublicationId;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>> {
        let sql = format!("SELECT {PUBLICATION_COLUMNS} FROM publications WHERE id = ?1");
        let publication = self
            .conn
            .query_row(&sql, params![id], Self::row_to_publication)
            .optional()?;
        Ok(publication)
    }

    fn save(&self, publication: &Self::Entity) -> Result<()> {
        let updated = self
            .conn
            .execute(
                "UPDATE publications SET
                    title = ?2, source = ?3, language = ?4, document_type = ?5,
                    publication_date = ?6, volume = ?7, issue = ?8, pages = ?9,
                    doi = ?10, wos_id = ?11, category = ?12, citations = ?13
                 WHERE id = ?1",
                params![
                    publication.id,
                    publication.title,
                    publication.source,
                    publication.language,
                    publication.document_type,
                    publication.publication_date,
                    publication.volume,
                    publication.issue,
                    publication.pages,
                    publication.doi,
                    publication.wos_id,
                    publication.category,
                    publication.citations,
                ],
            )
            .map_err(|e| CatalogError::from_write(e, format!("publication doi {:?}", publication.doi)))?;

        if updated == 0 {
            return Err(CatalogError::PublicationNotFound(publication.id.to_string()));
        }
        Ok(())
    }
}

impl<'a> PublicationRepository for SqlitePublicationRepository<'a> {
    fn find_by_doi(&self, doi: &str) -> Result<Option<Publication>> {
        let sql = format!("SELECT {PUBLICATION_COLUMNS} FROM publications WHERE doi = ?1");
        let publication = self
            .conn
            .query_row(&sql, params![doi], Self::row_to_publication)
            .optional()?;
        Ok(publication)
    }

    fn insert(&self, fields: &PublicationFields) -> Result<Publication> {
        fields.validate()?;
        self.conn
            .execute(
                "INSERT INTO publications
                    (title, source, publication_date, volume, issue, pages, doi)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    fields.title,
                    fields.source,
                    fields.publication_date,
                    fields.volume,
                    fields.issue,
                    fields.pages,
                    fields.doi,
                ],
            )
            .map_err(|e| CatalogError::from_write(e, format!("publication doi {:?} already exists", fields.doi)))?;

        let id = self.conn.last_insert_rowid();
        Ok(Publication::from_fields(id, fields))
    }

    fn update_fields(&self, id: PublicationId, fields: &PublicationFields) -> Result<Publication> {
        fields.validate()?;
        let mut publication = self
            .find_by_id(&id)?
            .ok_or_else(|| CatalogError::PublicationNotFound(id.to_string()))?;
        publication.apply_fields(fields);
        self.save(&publication)?;
        Ok(publication)
    }

    fn authors_of(&self, id: PublicationId) -> Result<Vec<Author>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.name, a.slug, a.h_index, a.email
             FROM publication_authors pa
             JOIN authors a ON a.id = pa.author_id
             WHERE pa.publication_id = ?1
             ORDER BY pa.position, a.id",
        )?;

        let authors = stmt
            .query_map(params![id], |row| {
                Ok(Author {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    slug: row.get(2)?,
                    h_index: row.get(3)?,
                    email: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(authors)
    }

    fn replace_authors(&self, id: PublicationId, author_ids: &[AuthorId]) -> Result<()> {
        self.conn.execute(
            "DELETE FROM publication_authors WHERE publication_id = ?1",
            params![id],
        )?;

        let mut stmt = self.conn.prepare(
            "INSERT OR IGNORE INTO publication_authors (publication_id, author_id, position)
             VALUES (?1, ?2, ?3)",
        )?;
        for (position, author_id) in author_ids.iter().enumerate() {
            stmt.execute(params![id, author_id, position as i64])?;
        }
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM publications", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
