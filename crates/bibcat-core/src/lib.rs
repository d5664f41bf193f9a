pub mod config;
pub mod error;
pub mod models;
pub mod storage;

pub use config::{AppConfig, CoreConfig, ImportConfig, LoggingConfig};
pub use error::{CatalogError, ExitCode, Result};
pub use models::*;

pub use storage::database::{ConnectionPool, Database, open_database, open_in_memory};
pub use storage::memory::MemoryStore;
pub use storage::queries::{CatalogStats, CatalogStatsQuery};
pub use storage::repositories::{
    AuthorRepository, PublicationRepository, Repository, SqliteAuthorRepository,
    SqlitePublicationRepository,
};
pub use storage::store::CatalogStore;
