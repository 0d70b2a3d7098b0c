//! Store boundary.
//!
//! The document store itself is an external collaborator; the core only
//! reads through `DocumentStore`. `MemoryStore` is an in-process
//! implementation for embedding and tests.

mod filter;
mod memory;
mod sort;

pub use filter::Filter;
pub use memory::{MemoryStore, StoreStats};
pub use sort::{Direction, SortKey, SortParseError, SortSpec};

use crate::value::Document;
use thiserror::Error as ThisError;

///
/// StoreError
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("document codec error: {0}")]
    Codec(String),
}

///
/// DocumentStore
///
/// Read surface the mapper and listener consume. All calls block the
/// calling thread until the store answers.
///

pub trait DocumentStore: Send + Sync {
    fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, StoreError>;

    /// Matching documents, in store order unless `sort` is given.
    fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Document>, StoreError>;

    fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;
}
