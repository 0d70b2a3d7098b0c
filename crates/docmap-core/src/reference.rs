//! Reference resolution.
//!
//! Converts between an entity's string identifier and what the store keeps
//! in a reference field. Two addressing modes exist:
//!
//! - native: a `DbRef` carrying the target collection and its native key
//! - manual: the bare native key
//!
//! The native key type follows the target's identity strategy.

use crate::{
    cache::{FieldCache, MetadataError},
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::{
        entity::EntityModel,
        field::{FieldRole, IdStrategy},
    },
    traits::Entity,
    types::ObjectId,
    value::{DbRef, FieldValue, Value},
};
use thiserror::Error as ThisError;

///
/// ReferenceError
///

#[derive(Debug, ThisError)]
pub enum ReferenceError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("'{id}' is not a valid {strategy} key for '{entity}'")]
    InvalidKey {
        entity: &'static str,
        id: String,
        strategy: &'static str,
    },

    #[error("stored {found} is not a reference")]
    NotAReference { found: &'static str },

    #[error("stored {found} has no key form")]
    NoKey { found: &'static str },
}

impl From<ReferenceError> for InternalError {
    fn from(err: ReferenceError) -> Self {
        match err {
            ReferenceError::Metadata(inner) => inner.into(),
            other => Self::new(ErrorClass::Conversion, ErrorOrigin::Reference, other.to_string()),
        }
    }
}

///
/// ReferenceResolver
///

#[derive(Clone, Copy, Debug)]
pub struct ReferenceResolver<'a> {
    fields: &'a FieldCache,
}

impl<'a> ReferenceResolver<'a> {
    #[must_use]
    pub const fn new(fields: &'a FieldCache) -> Self {
        Self { fields }
    }

    /// Native key for `id` under the target's identity strategy.
    pub fn to_db_id(
        &self,
        target: &'static EntityModel,
        id: &str,
    ) -> Result<Value, ReferenceError> {
        let field = self.fields.id_field(target)?;
        let FieldRole::Id(strategy) = field.role else {
            return Err(MetadataError::MissingIdentity {
                entity: target.path,
            }
            .into());
        };

        let invalid = |strategy: &'static str| ReferenceError::InvalidKey {
            entity: target.path,
            id: id.to_string(),
            strategy,
        };

        match strategy {
            IdStrategy::Generated => id
                .parse::<ObjectId>()
                .map(Value::ObjectId)
                .map_err(|_| invalid("object id")),
            IdStrategy::Incrementing => id
                .trim()
                .parse::<i64>()
                .map(Value::Int64)
                .map_err(|_| invalid("integer")),
            IdStrategy::UserDefined => Ok(Value::Text(id.to_string())),
        }
    }

    /// Stored form of a reference to `target`/`id`. An empty id is no
    /// reference at all and yields `Ok(None)`.
    pub fn try_to_reference(
        &self,
        manual: bool,
        target: &'static EntityModel,
        id: &str,
    ) -> Result<Option<Value>, ReferenceError> {
        if id.is_empty() {
            return Ok(None);
        }

        let key = self.to_db_id(target, id)?;
        if manual {
            Ok(Some(key))
        } else {
            Ok(Some(Value::Ref(DbRef::new(target.name, key))))
        }
    }

    /// Like `try_to_reference`, but failures are logged and yield `None`.
    #[must_use]
    pub fn to_reference(
        &self,
        manual: bool,
        target: &'static EntityModel,
        id: &str,
    ) -> Option<Value> {
        match self.try_to_reference(manual, target, id) {
            Ok(reference) => reference,
            Err(err) => {
                tracing::error!(entity = target.path, id, error = %err, "cannot build reference");
                None
            }
        }
    }

    /// Identifier carried by a stored reference.
    pub fn try_from_reference(
        &self,
        manual: bool,
        stored: &Value,
    ) -> Result<String, ReferenceError> {
        let key = if manual {
            stored
        } else {
            match stored {
                Value::Ref(r) => &*r.id,
                other => {
                    return Err(ReferenceError::NotAReference {
                        found: other.label(),
                    });
                }
            }
        };

        key.string_form().ok_or(ReferenceError::NoKey { found: key.label() })
    }

    /// Like `try_from_reference`, but failures are logged and yield `None`.
    #[must_use]
    pub fn from_reference(&self, manual: bool, stored: &Value) -> Option<String> {
        match self.try_from_reference(manual, stored) {
            Ok(id) => Some(id),
            Err(err) => {
                tracing::error!(error = %err, "cannot read reference");
                None
            }
        }
    }

    /// Current identifier of an entity; `None` when it has none yet.
    #[must_use]
    pub fn entity_id(&self, entity: &dyn Entity) -> Option<String> {
        let model = entity.model();
        let name = self.fields.id_field_name(model)?;

        match entity.get_value(name) {
            Some(FieldValue::Text(id)) if !id.is_empty() => Some(id),
            _ => None,
        }
    }
}

///
/// TESTS
///
