use crate::{
    cache::FieldCache,
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::entity::EntityModel,
    traits::{Entity, EntityKind},
};
use parking_lot::RwLock;
use thiserror::Error as ThisError;

///
/// RegistryError
///

#[derive(Debug, ThisError)]
pub enum RegistryError {
    #[error("entity '{0}' is not registered")]
    Unregistered(&'static str),
}

impl RegistryError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::Unregistered(_) => ErrorClass::NotFound,
        }
    }
}

impl From<RegistryError> for InternalError {
    fn from(err: RegistryError) -> Self {
        Self::new(err.class(), ErrorOrigin::Registry, err.to_string())
    }
}

/// Builds a default instance of one registered entity type.
pub type Constructor = fn() -> Box<dyn Entity>;

fn construct<E: EntityKind>() -> Box<dyn Entity> {
    Box::new(E::default())
}

///
/// EntityRegistry
///
/// Owns the field cache and the constructor table. Decoders use it to
/// instantiate reference targets and embedded objects by model; the
/// dependent-index listener uses it to find who references whom.
///

#[derive(Debug, Default)]
pub struct EntityRegistry {
    fields: FieldCache,
    entries: RwLock<Vec<(&'static EntityModel, Constructor)>>,
}

impl EntityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `E`; registering twice is a no-op.
    pub fn register<E: EntityKind>(&self) {
        let model = E::MODEL;
        let mut entries = self.entries.write();

        if entries.iter().any(|(m, _)| m.path == model.path) {
            return;
        }
        entries.push((model, construct::<E> as Constructor));

        tracing::debug!(entity = model.path, collection = model.name, "entity registered");
    }

    #[must_use]
    pub const fn fields(&self) -> &FieldCache {
        &self.fields
    }

    /// Fresh default instance of the type behind `model`.
    pub fn create(&self, model: &'static EntityModel) -> Result<Box<dyn Entity>, RegistryError> {
        let constructor = self
            .entries
            .read()
            .iter()
            .find(|(m, _)| m.path == model.path)
            .map(|(_, ctor)| *ctor)
            .ok_or(RegistryError::Unregistered(model.path))?;

        Ok(constructor())
    }

    /// Registered models, in registration order.
    #[must_use]
    pub fn models(&self) -> Vec<&'static EntityModel> {
        self.entries.read().iter().map(|(m, _)| *m).collect()
    }

    /// Registered models holding an index-propagating reference to `target`.
    #[must_use]
    pub fn models_referencing(&self, target: &EntityModel) -> Vec<&'static EntityModel> {
        self.models()
            .into_iter()
            .filter(|owner| {
                self.fields.get(*owner).iter().any(|f| {
                    f.propagates_index() && f.target_model().is_some_and(|t| t.path == target.path)
                })
            })
            .collect()
    }
}

///
/// TESTS
///
