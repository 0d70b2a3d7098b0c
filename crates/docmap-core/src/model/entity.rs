use crate::model::{field::FieldModel, index::IndexFilter};
use std::fmt;

///
/// EntityModel
/// Static runtime model for one entity type.
///

pub struct EntityModel {
    /// Fully-qualified Rust type path (cache key and diagnostics).
    pub path: &'static str,
    /// Collection name in the document store.
    pub name: &'static str,
    /// Ancestor whose fields this type inherits.
    pub parent: Option<&'static Self>,
    /// Fields declared on this type, in declaration order.
    pub fields: &'static [FieldModel],
    /// Conditions that must all hold for the entity to be indexed.
    pub index_filters: &'static [IndexFilter],
}

impl EntityModel {
    #[must_use]
    pub const fn new(
        path: &'static str,
        name: &'static str,
        fields: &'static [FieldModel],
    ) -> Self {
        Self {
            path,
            name,
            parent: None,
            fields,
            index_filters: &[],
        }
    }

    #[must_use]
    pub const fn with_parent(mut self, parent: &'static Self) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub const fn with_index_filters(mut self, filters: &'static [IndexFilter]) -> Self {
        self.index_filters = filters;
        self
    }

    /// This model followed by each ancestor, most-derived first.
    #[must_use]
    pub const fn lineage(&'static self) -> Lineage {
        Lineage { next: Some(self) }
    }
}

impl PartialEq for EntityModel {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for EntityModel {}

// Models can reference themselves through field kinds, so Debug stays shallow.
impl fmt::Debug for EntityModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityModel")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("parent", &self.parent.map(|p| p.path))
            .field("fields", &self.fields.len())
            .finish()
    }
}

impl fmt::Display for EntityModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

///
/// Lineage
///

pub struct Lineage {
    next: Option<&'static EntityModel>,
}

impl Iterator for Lineage {
    type Item = &'static EntityModel;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent;

        Some(current)
    }
}
