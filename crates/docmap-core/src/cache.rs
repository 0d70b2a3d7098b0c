use crate::{
    error::ErrorClass,
    model::{
        entity::EntityModel,
        field::{FieldModel, FieldRole},
    },
};
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error as ThisError;

///
/// MetadataError
///
/// Structural errors in an entity's declared fields. These are
/// configuration mistakes and are surfaced, never swallowed.
///

#[derive(Debug, ThisError)]
pub enum MetadataError {
    #[error("entity '{entity}' declares no identity field")]
    MissingIdentity { entity: &'static str },

    #[error("entity '{entity}' has no field or storage name '{field}'")]
    UnknownField { entity: &'static str, field: String },
}

impl MetadataError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::MissingIdentity { .. } => ErrorClass::InvariantViolation,
            Self::UnknownField { .. } => ErrorClass::NotFound,
        }
    }
}

///
/// FieldCache
///
/// Flattened, memoised field lists keyed by entity path. A model's own
/// fields come first, then each ancestor's in turn. Lists are built
/// outside the lock; when two callers race on first population the first
/// insert wins and both observe the same `Arc`.
///

#[derive(Debug, Default)]
pub struct FieldCache {
    entries: RwLock<HashMap<&'static str, Arc<[&'static FieldModel]>>>,
}

impl FieldCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every field of `model`, inherited ones included.
    pub fn get(&self, model: &'static EntityModel) -> Arc<[&'static FieldModel]> {
        if let Some(fields) = self.entries.read().get(model.path) {
            return Arc::clone(fields);
        }

        let computed: Arc<[&'static FieldModel]> =
            model.lineage().flat_map(|m| m.fields.iter()).collect();

        let mut entries = self.entries.write();
        let fields = entries.entry(model.path).or_insert_with(|| {
            tracing::debug!(
                entity = model.path,
                fields = computed.len(),
                "field cache populated"
            );
            computed
        });

        Arc::clone(fields)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    ///
    /// IDENTITY
    ///

    pub fn id_field(
        &self,
        model: &'static EntityModel,
    ) -> Result<&'static FieldModel, MetadataError> {
        self.get(model)
            .iter()
            .copied()
            .find(|f| f.is_identity())
            .ok_or(MetadataError::MissingIdentity { entity: model.path })
    }

    /// Identity field name; a missing identity is logged and yields `None`.
    #[must_use]
    pub fn id_field_name(&self, model: &'static EntityModel) -> Option<&'static str> {
        match self.id_field(model) {
            Ok(field) => Some(field.name),
            Err(err) => {
                tracing::error!(entity = model.path, error = %err, "identity lookup failed");
                None
            }
        }
    }

    ///
    /// LOOKUP
    ///

    /// Resolve by declared name first, then by alternate storage name.
    pub fn field(
        &self,
        model: &'static EntityModel,
        name: &str,
    ) -> Result<&'static FieldModel, MetadataError> {
        let fields = self.get(model);

        fields
            .iter()
            .copied()
            .find(|f| f.name == name)
            .or_else(|| {
                fields
                    .iter()
                    .copied()
                    .find(|f| f.alternate_name() == Some(name))
            })
            .ok_or_else(|| MetadataError::UnknownField {
                entity: model.path,
                field: name.to_string(),
            })
    }

    pub fn is_embed_field(
        &self,
        model: &'static EntityModel,
        name: &str,
    ) -> Result<bool, MetadataError> {
        let field = self.field(model, name)?;

        Ok(matches!(field.role, FieldRole::Embed(_)))
    }

    pub fn is_embed_list_field(
        &self,
        model: &'static EntityModel,
        name: &str,
    ) -> Result<bool, MetadataError> {
        let field = self.field(model, name)?;

        Ok(matches!(field.role, FieldRole::EmbedList(_)))
    }
}

///
/// TESTS
///
