//! Core data models for subgenre searches.

mod author;
mod search;
mod subgenre;

pub use author::{Author, AuthorBuilder, SubgenreEssay};
pub use search::{SearchBody, SearchKind, SearchOutcome, SearchRequest, SearchResult};
pub use subgenre::Subgenre;
