use crate::{
    index::{IndexError, Indexer, needs_index},
    traits::Entity,
};

///
/// IndexOutcome
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IndexOutcome {
    Updated,
    Removed,
}

///
/// IndexTask
///
/// One materialised entity waiting to be (re)indexed. Entities failing
/// their index filters are removed from the index instead.
///

#[derive(Debug)]
pub struct IndexTask {
    entity: Box<dyn Entity>,
    id: String,
}

impl IndexTask {
    #[must_use]
    pub fn new(entity: Box<dyn Entity>, id: impl Into<String>) -> Self {
        Self {
            entity,
            id: id.into(),
        }
    }

    #[must_use]
    pub fn entity(&self) -> &dyn Entity {
        &*self.entity
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn run(&self, indexer: &dyn Indexer) -> Result<IndexOutcome, IndexError> {
        if needs_index(self.entity()) {
            indexer.update(self.entity())?;
            Ok(IndexOutcome::Updated)
        } else {
            indexer.remove(self.entity.model(), &self.id)?;
            Ok(IndexOutcome::Removed)
        }
    }
}

///
/// TESTS
///
