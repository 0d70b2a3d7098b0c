//! Dependent-index propagation.
//!
//! When an entity changes, every document holding an index-propagating
//! reference to it is re-read and handed to the external indexer through a
//! bounded worker pool. Consistency is eventual: tasks for rapid successive
//! changes may complete in any order.

mod executor;
mod filter;
mod listener;
mod task;

pub use executor::{ExecutorOptions, ExecutorStats, IndexExecutor, OverflowPolicy, SubmitError};
pub use filter::needs_index;
pub use listener::RefChangeListener;
pub use task::{IndexOutcome, IndexTask};

use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::entity::EntityModel,
    traits::Entity,
};
use thiserror::Error as ThisError;

///
/// IndexError
///

#[derive(Debug, ThisError)]
pub enum IndexError {
    #[error("indexer failed: {0}")]
    Backend(String),

    #[error("invalid executor options: {0}")]
    InvalidOptions(&'static str),

    #[error("cannot start index worker: {0}")]
    Spawn(String),
}

impl IndexError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::Backend(_) | Self::Spawn(_) => ErrorClass::Internal,
            Self::InvalidOptions(_) => ErrorClass::Unsupported,
        }
    }
}

impl From<IndexError> for InternalError {
    fn from(err: IndexError) -> Self {
        Self::new(err.class(), ErrorOrigin::Index, err.to_string())
    }
}

///
/// Indexer
///
/// The external search index. Called from worker threads only.
///

pub trait Indexer: Send + Sync {
    /// Index or re-index one materialised entity.
    fn update(&self, entity: &dyn Entity) -> Result<(), IndexError>;

    fn remove(&self, model: &'static EntityModel, id: &str) -> Result<(), IndexError>;
}

///
/// TESTS
///
