mod author_repository;
mod publication_repository;

pub use author_repository::{AuthorRepository, SqliteAuthorRepository};
pub use publication_repository::{PublicationRepository, SqlitePublicationRepository};

use crate::error::Result;

pub trait Repository {
    type Entity;
    type Id;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>>;
    fn save(&self, entity: &Self::Entity) -> Result<()>;
}
