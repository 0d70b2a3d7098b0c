// -----------------------------------------------------------------------------
// Standard re-exports for `traits::X` ergonomics
// -----------------------------------------------------------------------------

pub use crate::value::{FromFieldValue, IntoFieldValue};
pub use num_traits::NumCast;
pub use std::fmt::Debug;

use crate::{
    model::entity::EntityModel,
    value::{FieldSetError, FieldValue},
};
use std::any::Any;

// ============================================================================
// FIELD ACCESS
// ============================================================================
//
// Compile-time replacement for reflective field access. Implementations are
// generated by `#[derive(FieldValues)]`.
//

///
/// FieldValues
///
/// Read and write a struct's fields by declared name.
///

pub trait FieldValues {
    /// `None` when no field has this name.
    fn get_value(&self, field: &str) -> Option<FieldValue>;

    fn set_value(&mut self, field: &str, value: FieldValue) -> Result<(), FieldSetError>;
}

// ============================================================================
// ENTITY
// ============================================================================

///
/// EntityKind
///
/// Binds a concrete type to its static model. Implement this and derive
/// `FieldValues`; `Entity` comes for free.
///

pub trait EntityKind: FieldValues + Clone + Debug + Default + Send + Sync + 'static {
    const MODEL: &'static EntityModel;
}

///
/// Entity
///
/// Object-safe view of any entity. Decoders work on `&mut dyn Entity`, and
/// decoded references travel as `Box<dyn Entity>`.
///

pub trait Entity: FieldValues + Debug + Send + Sync + 'static {
    fn model(&self) -> &'static EntityModel;

    fn clone_entity(&self) -> Box<dyn Entity>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<E: EntityKind> Entity for E {
    fn model(&self) -> &'static EntityModel {
        E::MODEL
    }

    fn clone_entity(&self) -> Box<dyn Entity> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl dyn Entity {
    /// Borrow the concrete type behind a decoded entity.
    #[must_use]
    pub fn downcast_ref<T: Entity>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}
