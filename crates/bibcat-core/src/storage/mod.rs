pub mod database;
pub mod memory;
pub mod queries;
pub mod repositories;
pub mod store;
