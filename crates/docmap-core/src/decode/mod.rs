//! Decoder framework.
//!
//! One decoder per field role. A decoder is selected once per field, reads
//! its raw value out of the document (under the field's storage name) and
//! sets the field on the target object.
//!
//! Decoding is fail-soft per field: a failing field is logged, reported and
//! left at its default value while the remaining fields still decode. A
//! default value in a decoded object therefore does not prove the stored
//! document lacked the field.

mod embed;
mod id;
mod property;
mod reference;
mod ref_list;


pub use embed::{EmbedDecoder, EmbedListDecoder};
pub use id::IdDecoder;
pub use property::PropertyDecoder;
pub use ref_list::RefListDecoder;
pub use reference::RefDecoder;

use crate::{
    coercion::CoercionError,
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::field::{FieldModel, FieldRole},
    reference::ReferenceError,
    registry::{EntityRegistry, RegistryError},
    store::{DocumentStore, SortParseError, StoreError},
    traits::Entity,
    value::{Document, FieldSetError, FieldValue, Value},
};
use thiserror::Error as ThisError;

///
/// DecodeError
/// Field-local decode failure.
///

#[derive(Debug, ThisError)]
pub enum DecodeError {
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    #[error("element {index}: {source}")]
    Element {
        index: usize,
        source: Box<Self>,
    },

    #[error("entry '{key}': {source}")]
    Entry { key: String, source: Box<Self> },

    #[error("expected {expected}, found {found}")]
    Shape {
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Set(#[from] FieldSetError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Sort(#[from] SortParseError),

    #[error("field kind {kind} cannot hold an entity")]
    NoTarget { kind: String },

    #[error("unresolvable reference")]
    Unresolved,
}

impl DecodeError {
    pub(crate) const fn shape(expected: &'static str, found: &Value) -> Self {
        Self::Shape {
            expected,
            found: found.label(),
        }
    }

    pub(crate) fn element(index: usize, source: Self) -> Self {
        Self::Element {
            index,
            source: Box::new(source),
        }
    }

    pub(crate) fn entry(key: &str, source: Self) -> Self {
        Self::Entry {
            key: key.to_string(),
            source: Box::new(source),
        }
    }

    pub(crate) fn class(&self) -> ErrorClass {
        match self {
            Self::Element { source, .. } | Self::Entry { source, .. } => source.class(),
            Self::Registry(err) => err.class(),
            Self::Store(_) => ErrorClass::Internal,
            Self::NoTarget { .. } => ErrorClass::Unsupported,
            _ => ErrorClass::Conversion,
        }
    }
}

impl From<DecodeError> for InternalError {
    fn from(err: DecodeError) -> Self {
        Self::new(err.class(), ErrorOrigin::Decode, err.to_string())
    }
}

///
/// FieldFailure
///

#[derive(Debug)]
pub struct FieldFailure {
    pub entity: &'static str,
    pub field: &'static str,
    pub error: DecodeError,
}

/// Cascade reads nested deeper than this fall back to stubs.
pub const MAX_CASCADE_DEPTH: usize = 16;

///
/// CascadeTrail
/// The targets enclosing cascade reads are currently materialising.
///

#[derive(Debug)]
pub struct CascadeTrail<'a> {
    collection: &'static str,
    key: Value,
    depth: usize,
    parent: Option<&'a CascadeTrail<'a>>,
}

impl CascadeTrail<'_> {
    fn contains(&self, collection: &str, key: &Value) -> bool {
        let mut node = Some(self);
        while let Some(trail) = node {
            if trail.collection == collection && &trail.key == key {
                return true;
            }
            node = trail.parent;
        }

        false
    }
}

///
/// DecodeContext
///
/// What decoders may consult: the registry (field cache and constructors)
/// and the store for cascading reads. Inside a cascade read the context
/// also carries the trail of targets being fetched, so a reference back
/// to one of them decodes to a stub instead of recursing.
///

#[derive(Clone, Copy)]
pub struct DecodeContext<'a> {
    pub registry: &'a EntityRegistry,
    pub store: &'a dyn DocumentStore,
    trail: Option<&'a CascadeTrail<'a>>,
}

impl<'a> DecodeContext<'a> {
    #[must_use]
    pub const fn new(registry: &'a EntityRegistry, store: &'a dyn DocumentStore) -> Self {
        Self {
            registry,
            store,
            trail: None,
        }
    }

    /// Number of cascade reads enclosing this context.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.trail.map_or(0, |t| t.depth)
    }

    /// Whether another cascade read may start here.
    #[must_use]
    pub fn can_cascade(&self) -> bool {
        self.depth() < MAX_CASCADE_DEPTH
    }

    /// Whether the target stored under `key` is already being fetched.
    #[must_use]
    pub fn is_fetching(&self, collection: &str, key: &Value) -> bool {
        self.trail.is_some_and(|t| t.contains(collection, key))
    }

    /// Trail entry for a target about to be materialised under this context.
    #[must_use]
    pub fn enter(&self, collection: &'static str, key: Value) -> CascadeTrail<'a> {
        CascadeTrail {
            collection,
            key,
            depth: self.depth() + 1,
            parent: self.trail,
        }
    }

    /// Context for decoding inside the target `trail` was entered for.
    #[must_use]
    pub fn within<'b>(&self, trail: &'b CascadeTrail<'b>) -> DecodeContext<'b>
    where
        'a: 'b,
    {
        DecodeContext {
            registry: self.registry,
            store: self.store,
            trail: Some(trail),
        }
    }
}

///
/// Decoder
///

pub trait Decoder {
    fn field(&self) -> &'static FieldModel;

    /// Set the field on `target` from the raw value.
    fn decode(&self, target: &mut dyn Entity) -> Result<(), DecodeError>;

    /// Hand a decoded value to the target.
    fn set(&self, target: &mut dyn Entity, value: FieldValue) -> Result<(), DecodeError> {
        target.set_value(self.field().name, value)?;

        Ok(())
    }
}

/// Pick the decoder for `field`. Absent and null raw values get none and
/// the field keeps its default.
#[must_use]
pub fn decoder_for<'a>(
    field: &'static FieldModel,
    doc: &'a Document,
    ctx: DecodeContext<'a>,
) -> Option<Box<dyn Decoder + 'a>> {
    let raw = doc.get(field.storage_name()).filter(|v| !v.is_null())?;

    let decoder: Box<dyn Decoder + 'a> = match field.role {
        FieldRole::Id(_) => Box::new(IdDecoder::new(field, raw)),
        FieldRole::Property(_) => Box::new(PropertyDecoder::new(field, raw)),
        FieldRole::Embed(_) => Box::new(EmbedDecoder::new(field, raw, ctx)),
        FieldRole::EmbedList(_) => Box::new(EmbedListDecoder::new(field, raw, ctx)),
        FieldRole::Ref(options) => Box::new(RefDecoder::new(field, options, raw, ctx)),
        FieldRole::RefList(options) => Box::new(RefListDecoder::new(field, options, raw, ctx)),
    };

    Some(decoder)
}

/// Decode every field of `doc` into `target`, returning the failures.
pub fn decode_into(
    ctx: DecodeContext<'_>,
    target: &mut dyn Entity,
    doc: &Document,
) -> Vec<FieldFailure> {
    let model = target.model();
    let fields = ctx.registry.fields().get(model);
    let mut failures = Vec::new();

    for field in fields.iter().copied() {
        let Some(decoder) = decoder_for(field, doc, ctx) else {
            continue;
        };

        if let Err(error) = decoder.decode(target) {
            tracing::warn!(
                entity = model.path,
                field = field.name,
                error = %error,
                "field decode failed"
            );
            failures.push(FieldFailure {
                entity: model.path,
                field: field.name,
                error,
            });
        }
    }

    failures
}
