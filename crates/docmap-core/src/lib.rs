//! Core runtime for docmap: entity models, stored values, the metadata cache,
//! coercion rules, the decoder framework, reference resolution, and the
//! dependent-index listener.
#![warn(unreachable_pub)]

extern crate self as docmap;

// public exports are one module level down
pub mod cache;
pub mod coercion;
pub mod decode;
pub mod encode;
pub mod error;
pub mod index;
pub mod mapper;
pub mod model;
pub mod reference;
pub mod registry;
pub mod store;
pub mod traits;
pub mod types;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// CONSTANTS
///

/// Storage key under which every entity keeps its identity.
pub const ID_KEY: &str = "_id";

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, stores, decoders, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        model::{
            entity::EntityModel,
            field::{
                EmbedOptions, FieldKind, FieldModel, FieldRole, IdStrategy, PropertyOptions,
                RefListOptions, RefOptions, ScalarKind,
            },
        },
        traits::{Entity, EntityKind, FieldValues},
        types::{Blob, Date, ObjectId, Timestamp},
        value::{Document, FieldValue, Value},
    };
}
