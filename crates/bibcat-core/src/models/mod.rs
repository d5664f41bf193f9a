pub mod author;
pub mod publication;

pub use author::*;
pub use publication::*;
