use rusqlite::Connection;
use serde::Serialize;
use std::sync::MutexGuard;

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub publications: usize,
    pub authors: usize,
    pub with_doi: usize,
    pub with_date: usize,
    pub authorships: usize,
}

pub struct CatalogStatsQuery<'a> {
    conn: MutexGuard<'a, Connection>,
}

impl<'a> CatalogStatsQuery<'a> {
    pub fn new(conn: MutexGuard<'a, Connection>) -> Self {
        Self { conn }
    }

    fn count(&self, sql: &str) -> Result<usize> {
        let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(n as usize)
    }

    pub fn get_stats(&self) -> Result<CatalogStats> {
        Ok(CatalogStats {
            publications: self.count("SELECT COUNT(*) FROM publications")?,
            authors: self.count("SELECT COUNT(*) FROM authors")?,
            with_doi: self.count("SELECT COUNT(*) FROM publications WHERE doi IS NOT NULL")?,
            with_date: self
                .count("SELECT COUNT(*) FROM publications WHERE publication_date IS NOT NULL")?,
            authorships: self.count("SELECT COUNT(*) FROM publication_authors")?,
        })
    }
}
