//! ## Crate layout
//! - `core`: runtime value and entity model, metadata cache, coercion,
//!   decoders, encoder, reference resolver, store boundary, and the
//!   dependent-index listener.
//! - `config`: TOML configuration for logging and the index executor.
//! - `logging`: `tracing-subscriber` initialisation.
//! - `Odm`: composition root wiring a store, an indexer and the registry.
//!
//! Entities declare a static `EntityModel`, implement `EntityKind` and
//! `#[derive(FieldValues)]`; everything else goes through `Odm`.

pub use docmap_core as core;
pub use docmap_derive::FieldValues;

// generated code refers to these paths
pub use docmap_core::{
    ID_KEY, cache, coercion, decode, encode, error, index, mapper, model, reference, registry,
    store, traits, types, value,
};

pub mod config;
pub mod logging;
mod odm;

pub use odm::Odm;

use crate::{config::ConfigError, core::error::InternalError};
use thiserror::Error as ThisError;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Error
/// Top-level error for building and running an `Odm`.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        FieldValues, Odm,
        core::{
            mapper::Mapper,
            model::{
                entity::EntityModel,
                field::{
                    EmbedOptions, FieldKind, FieldModel, FieldRole, IdStrategy, PropertyOptions,
                    RefListOptions, RefOptions, ScalarKind,
                },
                index::{Compare, IndexFilter},
            },
            store::{DocumentStore, Filter, SortSpec},
            traits::{Entity, EntityKind, FieldValues},
            types::{Blob, Date, ObjectId, Timestamp},
            value::{DbRef, Document, FieldValue, Value},
        },
    };
}
