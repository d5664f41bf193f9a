use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: u32 = 2;

pub fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        ",
    )?;
    Ok(())
}

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS authors (
            id       INTEGER PRIMARY KEY AUTOINCREMENT,
            name     TEXT NOT NULL UNIQUE,
            slug     TEXT NOT NULL UNIQUE,
            h_index  INTEGER,
            email    TEXT
        );

        CREATE TABLE IF NOT EXISTS publications (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            title            TEXT NOT NULL CHECK (length(title) > 0),
            source           TEXT,
            language         TEXT NOT NULL DEFAULT '',
            document_type    TEXT NOT NULL DEFAULT '',
            publication_date TEXT,
            volume           TEXT,
            issue            TEXT,
            pages            TEXT,
            doi              TEXT UNIQUE,
            wos_id           TEXT UNIQUE,
            category         TEXT,
            citations        INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS publication_authors (
            publication_id INTEGER NOT NULL REFERENCES publications(id) ON DELETE CASCADE,
            author_id      INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
            position       INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (publication_id, author_id)
        );
        ",
    )?;
    Ok(())
}

pub fn create_indexes(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_publications_date      ON publications(publication_date);
        CREATE INDEX IF NOT EXISTS idx_publication_authors_au ON publication_authors(author_id);
        ",
    )?;
    Ok(())
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    create_tables(conn)?;
    create_indexes(conn)?;
    Ok(())
}
