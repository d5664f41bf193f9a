use rusqlite::Connection;

use super::Migration;
use crate::error::Result;

pub struct V2AuthorPosition;

impl Migration for V2AuthorPosition {
    fn version(&self) -> u32 {
        2
    }

    fn description(&self) -> &'static str {
        "Add position column to publication_authors to keep author order"
    }

    fn up(&self, conn: &Connection) -> Result<()> {
        let has_position: bool = conn
            .prepare("SELECT 1 FROM pragma_table_info('publication_authors') WHERE name='position'")?
            .exists([])?;

        if !has_position {
            conn.execute_batch(
                "
                ALTER TABLE publication_authors ADD COLUMN position INTEGER NOT NULL DEFAULT 0;
                CREATE INDEX IF NOT EXISTS idx_publication_authors_au ON publication_authors(author_id);
                ",
            )?;
        }
        Ok(())
    }
}
