use rusqlite::{params, Connection, OptionalExtension};
use std::sync::MutexGuard;

use crate::error::{CatalogError, Result};
use crate::models::{Author, AuthorId, NewAuthor};

use super::Repository;

pub trait AuthorRepository: Repository<Entity = Author, Id = AuthorId> {
    fn find_by_name(&self, name: &str) -> Result<Option<Author>>;
    fn find_by_slug(&self, slug: &str) -> Result<Option<Author>>;
    fn slug_exists(&self, slug: &str) -> Result<bool>;
    fn insert(&self, author: &NewAuthor) -> Result<Author>;
    fn count(&self) -> Result<usize>;
}

pub struct SqliteAuthorRepository<'a> {
    conn: MutexGuard<'a, Connection>,
}

const AUTHOR_COLUMNS: &str = "id, name, slug, h_index, email";

impl<'a> SqliteAuthorRepository<'a> {
    pub fn new(conn: MutexGuard<'a, Connection>) -> Self {
        Self { conn }
    }

    fn row_to_author(row: &rusqlite::Row) -> rusqlite::Result<Author> {
        Ok(Author {
            id: row.get(0)?,
            name: row.get(1)?,
            slug: row.get(2)?,
            h_index: row.get(3)?,
            email: row.get(4)?,
        })
    }

    fn find_one(&self, column: &str, value: &dyn rusqlite::ToSql) -> Result<Option<Author>> {
        let sql = format!("SELECT {AUTHOR_COLUMNS} FROM authors WHERE {column} = ?1");
        let author = self
            .conn
            .query_row(&sql, [value], Self::row_to_author)
            .optional()?;
        Ok(author)
    }
}

impl<'a> Repository for SqliteAuthorRepository<'a> {
    type Entity = Author;
    type Id = AuthorId;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>> {
        self.find_one("id", id)
    }

    fn save(&self, author: &Self::Entity) -> Result<()> {
        let updated = self
            .conn
            .execute(
                "UPDATE authors SET name = ?2, slug = ?3, h_index = ?4, email = ?5 WHERE id = ?1",
                params![author.id, author.name, author.slug, author.h_index, author.email],
            )
            .map_err(|e| CatalogError::from_write(e, format!("author {:?}", author.name)))?;

        if updated == 0 {
            return Err(CatalogError::AuthorNotFound(author.id.to_string()));
        }
        Ok(())
    }
}

impl<'a> AuthorRepository for SqliteAuthorRepository<'a> {
    fn find_by_name(&self, name: &str) -> Result<Option<Author>> {
        self.find_one("name", &name)
    }

    fn find_by_slug(&self, slug: &str) -> Result<Option<Author>> {
        self.find_one("slug", &slug)
    }

    fn slug_exists(&self, slug: &str) -> Result<bool> {
        let exists = self
            .conn
            .prepare("SELECT 1 FROM authors WHERE slug = ?1")?
            .exists(params![slug])?;
        Ok(exists)
    }

    fn insert(&self, author: &NewAuthor) -> Result<Author> {
        self.conn
            .execute(
                "INSERT INTO authors (name, slug, h_index, email) VALUES (?1, ?2, ?3, ?4)",
                params![author.name, author.slug, author.h_index, author.email],
            )
            .map_err(|e| {
                CatalogError::from_write(
                    e,
                    format!("author {:?} / slug {:?} already exists", author.name, author.slug),
                )
            })?;

        let id = self.conn.last_insert_rowid();
        Ok(author.clone().into_author(id))
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM authors", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
