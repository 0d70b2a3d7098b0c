//! Entity to document.
//!
//! The inverse of decoding. Identity goes to `_id` as the native key of its
//! strategy, plain values are widened to the store's default widths,
//! embedded objects become nested documents and references go through the
//! reference resolver. Null values are left out of the document.

use crate::{
    cache::{FieldCache, MetadataError},
    coercion,
    error::InternalError,
    model::field::{FieldModel, FieldRole},
    reference::{ReferenceError, ReferenceResolver},
    traits::Entity,
    value::{Document, FieldValue, Value},
};
use thiserror::Error as ThisError;

///
/// EncodeError
///

#[derive(Debug, ThisError)]
pub enum EncodeError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error("field '{field}': cannot store {found} as {kind}")]
    Unsupported {
        field: &'static str,
        kind: String,
        found: &'static str,
    },
}

impl From<EncodeError> for InternalError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::Metadata(inner) => inner.into(),
            EncodeError::Reference(inner) => inner.into(),
            other @ EncodeError::Unsupported { .. } => Self::encode_conversion(other.to_string()),
        }
    }
}

fn unsupported(field: &FieldModel, found: &FieldValue) -> EncodeError {
    EncodeError::Unsupported {
        field: field.name,
        kind: field.kind.to_string(),
        found: found.label(),
    }
}

///
/// Encoder
///

#[derive(Clone, Copy, Debug)]
pub struct Encoder<'a> {
    fields: &'a FieldCache,
}

impl<'a> Encoder<'a> {
    #[must_use]
    pub const fn new(fields: &'a FieldCache) -> Self {
        Self { fields }
    }

    const fn resolver(&self) -> ReferenceResolver<'a> {
        ReferenceResolver::new(self.fields)
    }

    pub fn encode(&self, entity: &dyn Entity) -> Result<Document, EncodeError> {
        let model = entity.model();
        let mut doc = Document::new();

        for field in self.fields.get(model).iter().copied() {
            let Some(value) = entity.get_value(field.name) else {
                continue;
            };
            if value.is_null() {
                continue;
            }

            let stored = match field.role {
                FieldRole::Id(_) => match &value {
                    FieldValue::Text(id) if id.is_empty() => None,
                    FieldValue::Text(id) => Some(self.resolver().to_db_id(model, id)?),
                    other => return Err(unsupported(field, other)),
                },
                FieldRole::Property(_) => Some(encode_plain(field, &value)?),
                FieldRole::Embed(_) => Some(self.encode_embedded(field, &value)?),
                FieldRole::EmbedList(_) => Some(self.encode_embed_list(field, &value)?),
                FieldRole::Ref(options) => self.encode_ref(field, options.manual, &value)?,
                FieldRole::RefList(options) => {
                    Some(self.encode_ref_list(field, options.manual, &value)?)
                }
            };

            if let Some(stored) = stored {
                doc.insert(field.storage_name(), stored);
            }
        }

        Ok(doc)
    }

    fn encode_embedded(
        &self,
        field: &FieldModel,
        value: &FieldValue,
    ) -> Result<Value, EncodeError> {
        match value {
            FieldValue::Entity(e) => self.encode(&**e).map(Value::Document),
            other => Err(unsupported(field, other)),
        }
    }

    fn encode_embed_list(
        &self,
        field: &FieldModel,
        value: &FieldValue,
    ) -> Result<Value, EncodeError> {
        if let FieldValue::Map(entries) = value {
            let mut doc = Document::new();
            for (k, v) in entries {
                doc.insert(k.clone(), self.encode_embedded(field, v)?);
            }
            return Ok(Value::Document(doc));
        }

        let items = value.as_elements().ok_or_else(|| unsupported(field, value))?;
        items
            .iter()
            .map(|item| self.encode_embedded(field, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List)
    }

    // An entity without an id yet is not referenceable and is left out.
    fn encode_ref(
        &self,
        field: &FieldModel,
        manual: bool,
        value: &FieldValue,
    ) -> Result<Option<Value>, EncodeError> {
        let FieldValue::Entity(entity) = value else {
            return Err(unsupported(field, value));
        };

        let resolver = self.resolver();
        let Some(id) = resolver.entity_id(&**entity) else {
            return Ok(None);
        };

        Ok(resolver.try_to_reference(manual, entity.model(), &id)?)
    }

    fn encode_ref_list(
        &self,
        field: &FieldModel,
        manual: bool,
        value: &FieldValue,
    ) -> Result<Value, EncodeError> {
        if let FieldValue::Map(entries) = value {
            let mut doc = Document::new();
            for (k, v) in entries {
                let stored = match v {
                    FieldValue::Null => None,
                    other => self.encode_ref(field, manual, other)?,
                };
                doc.insert(k.clone(), stored.unwrap_or(Value::Null));
            }
            return Ok(Value::Document(doc));
        }

        let items = value.as_elements().ok_or_else(|| unsupported(field, value))?;
        let positional = coercion::is_array(&field.kind);
        let mut refs = Vec::with_capacity(items.len());
        for item in items {
            let stored = match item {
                FieldValue::Null => None,
                other => self.encode_ref(field, manual, other)?,
            };
            match stored {
                Some(stored) => refs.push(stored),
                None if positional => refs.push(Value::Null),
                None => {}
            }
        }

        Ok(Value::List(refs))
    }
}

fn encode_plain(field: &FieldModel, value: &FieldValue) -> Result<Value, EncodeError> {
    if let Some(items) = value.as_elements() {
        return items
            .iter()
            .map(|item| encode_plain(field, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List);
    }

    if let FieldValue::Map(entries) = value {
        let mut doc = Document::new();
        for (k, v) in entries {
            doc.insert(k.clone(), encode_plain(field, v)?);
        }
        return Ok(Value::Document(doc));
    }

    coercion::widen_scalar(value).ok_or_else(|| unsupported(field, value))
}

///
/// TESTS
///
