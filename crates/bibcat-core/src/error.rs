use thiserror::Error;

/// All errors that can occur in bibcat-core.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Author not found: {0}")]
    AuthorNotFound(String),

    #[error("Publication not found: {0}")]
    PublicationNotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl CatalogError {
    /// Maps SQLite unique-constraint failures onto `Conflict`, everything
    /// else onto `Database`.
    pub fn from_write(err: rusqlite::Error, what: impl std::fmt::Display) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, _)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                CatalogError::Conflict(what.to_string())
            }
            other => CatalogError::Database(other),
        }
    }
}

/// Exit codes the CLI sets explicitly. Other failures exit with 1.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    NotFound = 2,
    FileSystemError = 4,
}

pub type Result<T> = std::result::Result<T, CatalogError>;
