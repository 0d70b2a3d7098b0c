use crate::{
    Error,
    config::OdmConfig,
    core::{
        error::InternalError,
        index::{ExecutorStats, IndexExecutor, Indexer, RefChangeListener},
        mapper::Mapper,
        model::entity::EntityModel,
        registry::EntityRegistry,
        store::DocumentStore,
        traits::EntityKind,
    },
};
use std::sync::Arc;

///
/// Odm
///
/// Composition root. Owns the entity registry (and with it the field
/// cache), the store handle and the index executor. Nothing here is
/// global; build one per store.
///

pub struct Odm {
    config: OdmConfig,
    registry: Arc<EntityRegistry>,
    store: Arc<dyn DocumentStore>,
    executor: Arc<IndexExecutor>,
    mapper: Mapper,
}

impl Odm {
    /// Validate `config` and start the index workers.
    pub fn new(
        config: OdmConfig,
        store: Arc<dyn DocumentStore>,
        indexer: Arc<dyn Indexer>,
    ) -> Result<Self, Error> {
        config.validate()?;

        let registry = Arc::new(EntityRegistry::new());
        let executor =
            IndexExecutor::start(indexer, config.index).map_err(InternalError::from)?;
        let mapper = Mapper::new(Arc::clone(&registry), Arc::clone(&store));

        tracing::debug!(
            workers = config.index.workers,
            queue_capacity = config.index.queue_capacity,
            "odm ready"
        );

        Ok(Self {
            config,
            registry,
            store,
            executor: Arc::new(executor),
            mapper,
        })
    }

    /// Register an entity type; returns `self` for chaining.
    pub fn register<E: EntityKind>(&self) -> &Self {
        self.registry.register::<E>();
        self
    }

    #[must_use]
    pub const fn config(&self) -> &OdmConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// Listener over the registered types that propagate index changes
    /// from `changed`.
    #[must_use]
    pub fn listener_for(&self, changed: &EntityModel) -> RefChangeListener {
        RefChangeListener::new(
            self.registry.models_referencing(changed),
            Arc::clone(&self.registry),
            Arc::clone(&self.store),
            Arc::clone(&self.executor),
        )
    }

    /// Queue re-index tasks for everything referencing `E` with `id`.
    /// Returns the number of tasks submitted.
    pub fn entity_changed<E: EntityKind>(&self, id: &str) -> Result<usize, InternalError> {
        self.listener_for(E::MODEL).entity_changed(E::MODEL, id)
    }

    #[must_use]
    pub fn index_stats(&self) -> ExecutorStats {
        self.executor.stats()
    }

    /// Drain queued index work and stop the workers.
    pub fn shutdown(&self) -> ExecutorStats {
        self.executor.shutdown()
    }
}
