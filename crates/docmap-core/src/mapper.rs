use crate::{
    decode::{DecodeContext, FieldFailure, decode_into},
    encode::Encoder,
    error::InternalError,
    reference::ReferenceResolver,
    registry::EntityRegistry,
    store::{DocumentStore, Filter, SortSpec},
    traits::{Entity, EntityKind},
    value::Document,
};
use std::sync::Arc;

///
/// Mapper
///
/// Typed read surface over one store. Structural errors (identity,
/// registry, store) are returned; field-local conversion failures are not,
/// so a returned entity may hold defaults where its document was malformed.
/// Use `decode_with_report` to see those failures.
///

#[derive(Clone)]
pub struct Mapper {
    registry: Arc<EntityRegistry>,
    store: Arc<dyn DocumentStore>,
}

impl Mapper {
    #[must_use]
    pub fn new(registry: Arc<EntityRegistry>, store: Arc<dyn DocumentStore>) -> Self {
        Self { registry, store }
    }

    #[must_use]
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    fn context(&self) -> DecodeContext<'_> {
        DecodeContext::new(&self.registry, self.store.as_ref())
    }

    /// Decode `doc` into a fresh `E`, returning the field-local failures.
    #[must_use]
    pub fn decode_with_report<E: EntityKind>(&self, doc: &Document) -> (E, Vec<FieldFailure>) {
        let mut entity = E::default();
        let failures = decode_into(self.context(), &mut entity, doc);

        (entity, failures)
    }

    #[must_use]
    pub fn from_document<E: EntityKind>(&self, doc: &Document) -> E {
        self.decode_with_report(doc).0
    }

    pub fn to_document(&self, entity: &dyn Entity) -> Result<Document, InternalError> {
        let doc = Encoder::new(self.registry.fields()).encode(entity)?;

        Ok(doc)
    }

    pub fn find_one<E: EntityKind>(&self, filter: &Filter) -> Result<Option<E>, InternalError> {
        let doc = self.store.find_one(E::MODEL.name, filter)?;

        Ok(doc.map(|doc| self.from_document(&doc)))
    }

    pub fn find<E: EntityKind>(
        &self,
        filter: &Filter,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<E>, InternalError> {
        let docs = self.store.find(E::MODEL.name, filter, sort)?;

        Ok(docs.iter().map(|doc| self.from_document(doc)).collect())
    }

    pub fn count<E: EntityKind>(&self, filter: &Filter) -> Result<u64, InternalError> {
        let count = self.store.count(E::MODEL.name, filter)?;

        Ok(count)
    }

    /// Look up `E` by its string identifier, converted to the native key of
    /// its identity strategy.
    pub fn find_by_id<E: EntityKind>(&self, id: &str) -> Result<Option<E>, InternalError> {
        let key = ReferenceResolver::new(self.registry.fields()).to_db_id(E::MODEL, id)?;

        self.find_one(&Filter::by_id(key))
    }
}

///
/// TESTS
///
