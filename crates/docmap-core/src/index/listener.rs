use crate::{
    decode::{DecodeContext, decode_into},
    error::InternalError,
    index::{IndexExecutor, IndexTask},
    model::entity::EntityModel,
    reference::ReferenceResolver,
    registry::EntityRegistry,
    store::{DocumentStore, Filter},
};
use std::{collections::HashSet, sync::Arc};

///
/// RefChangeListener
///
/// Re-indexes the documents that reference a changed entity. `ref_by` is
/// the set of owner types to inspect, fixed at construction; see
/// `EntityRegistry::models_referencing`.
///

pub struct RefChangeListener {
    ref_by: Vec<&'static EntityModel>,
    registry: Arc<EntityRegistry>,
    store: Arc<dyn DocumentStore>,
    executor: Arc<IndexExecutor>,
}

impl RefChangeListener {
    #[must_use]
    pub fn new(
        ref_by: Vec<&'static EntityModel>,
        registry: Arc<EntityRegistry>,
        store: Arc<dyn DocumentStore>,
        executor: Arc<IndexExecutor>,
    ) -> Self {
        Self {
            ref_by,
            registry,
            store,
            executor,
        }
    }

    /// Submit one re-index task per owner document referencing
    /// `changed`/`id` through an index-propagating field. Returns the
    /// number of tasks submitted; rejected submissions are logged and not
    /// counted.
    pub fn entity_changed(
        &self,
        changed: &'static EntityModel,
        id: &str,
    ) -> Result<usize, InternalError> {
        let fields = self.registry.fields();
        let resolver = ReferenceResolver::new(fields);
        let ctx = DecodeContext::new(&self.registry, self.store.as_ref());
        let mut submitted = 0;

        for owner in self.ref_by.iter().copied() {
            let mut seen = HashSet::new();

            for field in fields.get(owner).iter().copied().filter(|f| {
                f.propagates_index() && f.target_model().is_some_and(|t| t.path == changed.path)
            }) {
                let Some(reference) =
                    resolver.to_reference(field.is_manual_reference(), changed, id)
                else {
                    continue;
                };

                let filter = Filter::eq(field.storage_name(), reference);
                let docs = self.store.find(owner.name, &filter, None)?;

                tracing::debug!(
                    entity = owner.path,
                    field = field.name,
                    changed = changed.path,
                    id,
                    matches = docs.len(),
                    "dependent documents found"
                );

                for doc in &docs {
                    let mut entity = self.registry.create(owner)?;
                    decode_into(ctx, entity.as_mut(), doc);

                    let owner_id = resolver.entity_id(&*entity).unwrap_or_default();
                    // a document matched by two fields is re-indexed once
                    if !owner_id.is_empty() && !seen.insert(owner_id.clone()) {
                        continue;
                    }

                    match self.executor.submit(IndexTask::new(entity, owner_id)) {
                        Ok(()) => submitted += 1,
                        Err(err) => {
                            tracing::warn!(
                                entity = owner.path,
                                error = %err,
                                "re-index task not submitted"
                            );
                        }
                    }
                }
            }
        }

        Ok(submitted)
    }
}

///
/// TESTS
///
