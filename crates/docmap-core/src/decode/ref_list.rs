use crate::{
    ID_KEY, coercion,
    decode::{
        DecodeContext, DecodeError, Decoder,
        embed::{materialize, target_of},
        reference::stub,
    },
    model::{
        entity::EntityModel,
        field::{FieldModel, RefListOptions},
    },
    reference::ReferenceResolver,
    store::{Filter, SortSpec},
    traits::Entity,
    value::{FieldValue, Value},
};
use std::collections::HashMap;

///
/// RefListDecoder
///
/// Reference collections in three shapes: array, list-like (list, set,
/// queue) and string-keyed map.
///
/// Without cascade every reference becomes a stub. With cascade all ids go
/// out in one `_id IN [...]` query, sorted when the field declares a sort.
/// List-like shapes take the fetched entities in the order the store
/// returns them, so null and dangling references shrink the result. Arrays
/// are positional and maps keep every key: both hold null where an entry
/// does not resolve.
///

pub struct RefListDecoder<'a> {
    field: &'static FieldModel,
    options: RefListOptions,
    raw: &'a Value,
    ctx: DecodeContext<'a>,
}

impl<'a> RefListDecoder<'a> {
    #[must_use]
    pub const fn new(
        field: &'static FieldModel,
        options: RefListOptions,
        raw: &'a Value,
        ctx: DecodeContext<'a>,
    ) -> Self {
        Self {
            field,
            options,
            raw,
            ctx,
        }
    }

    fn resolver(&self) -> ReferenceResolver<'a> {
        ReferenceResolver::new(self.ctx.registry.fields())
    }

    // absent and null entries are empty slots; anything else must resolve
    fn read_id(&self, resolver: &ReferenceResolver<'_>, item: &Value) -> Option<String> {
        if item.is_null() {
            return None;
        }

        resolver.from_reference(self.options.manual, item)
    }

    // one batched lookup for every id; targets already being fetched further
    // up become stubs and follow the fetched ones
    fn fetch_all(
        &self,
        model: &'static EntityModel,
        ids: &[String],
    ) -> Result<Vec<Box<dyn Entity>>, DecodeError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        if !self.ctx.can_cascade() {
            tracing::debug!(
                entity = model.path,
                field = self.field.name,
                depth = self.ctx.depth(),
                "cascade depth reached"
            );
            return ids.iter().map(|id| stub(self.ctx, model, id)).collect();
        }

        let resolver = self.resolver();
        let mut keys = Vec::with_capacity(ids.len());
        let mut repeated = Vec::new();
        for id in ids {
            let key = resolver.to_db_id(model, id)?;
            if self.ctx.is_fetching(model.name, &key) {
                repeated.push(stub(self.ctx, model, id)?);
            } else {
                keys.push(key);
            }
        }

        let requested = keys.len();
        let docs = if keys.is_empty() {
            Vec::new()
        } else {
            let sort = self.options.sort.map(SortSpec::parse).transpose()?;
            self.ctx
                .store
                .find(model.name, &Filter::is_in(ID_KEY, keys), sort.as_ref())?
        };

        if docs.len() < requested {
            tracing::debug!(
                entity = model.path,
                field = self.field.name,
                requested,
                found = docs.len(),
                "reference batch partially resolved"
            );
        }

        let mut entities = Vec::with_capacity(docs.len() + repeated.len());
        for doc in &docs {
            let key = doc.get(ID_KEY).cloned().unwrap_or(Value::Null);
            let trail = self.ctx.enter(model.name, key);
            entities.push(materialize(self.ctx.within(&trail), model, doc)?);
        }
        entities.extend(repeated);

        Ok(entities)
    }

    fn fetch_by_id(
        &self,
        model: &'static EntityModel,
        ids: &[String],
    ) -> Result<HashMap<String, Box<dyn Entity>>, DecodeError> {
        let resolver = self.resolver();
        let mut by_id = HashMap::new();
        for entity in self.fetch_all(model, ids)? {
            if let Some(id) = resolver.entity_id(&*entity) {
                by_id.insert(id, entity);
            }
        }

        Ok(by_id)
    }

    // one value per slot, null where the slot holds no live target
    fn resolve_slots(
        &self,
        model: &'static EntityModel,
        slots: &[Option<String>],
    ) -> Result<Vec<FieldValue>, DecodeError> {
        if self.options.cascade_read {
            let ids: Vec<String> = slots.iter().flatten().cloned().collect();
            let by_id = self.fetch_by_id(model, &ids)?;

            return Ok(slots
                .iter()
                .map(|id| {
                    id.as_ref()
                        .and_then(|id| by_id.get(id))
                        .map_or(FieldValue::Null, |e| FieldValue::Entity(e.clone_entity()))
                })
                .collect());
        }

        slots
            .iter()
            .map(|id| match id {
                Some(id) => stub(self.ctx, model, id).map(FieldValue::Entity),
                None => Ok(FieldValue::Null),
            })
            .collect()
    }

    fn decode_sequence(&self, model: &'static EntityModel) -> Result<FieldValue, DecodeError> {
        let items = self
            .raw
            .as_list()
            .ok_or_else(|| DecodeError::shape("list", self.raw))?;

        let resolver = self.resolver();
        let slots: Vec<Option<String>> =
            items.iter().map(|item| self.read_id(&resolver, item)).collect();

        if coercion::is_array(&self.field.kind) {
            return self.resolve_slots(model, &slots).map(FieldValue::Array);
        }

        let ids: Vec<String> = slots.into_iter().flatten().collect();
        let entities = if self.options.cascade_read {
            self.fetch_all(model, &ids)?
        } else {
            ids.iter()
                .map(|id| stub(self.ctx, model, id))
                .collect::<Result<Vec<_>, _>>()?
        };

        let items = entities.into_iter().map(FieldValue::Entity).collect();

        Ok(coercion::rebuild_sequence(&self.field.kind, items))
    }

    fn decode_map(&self, model: &'static EntityModel) -> Result<FieldValue, DecodeError> {
        let doc = self
            .raw
            .as_document()
            .ok_or_else(|| DecodeError::shape("document", self.raw))?;

        let resolver = self.resolver();
        let keys: Vec<String> = doc.entries().iter().map(|(k, _)| k.clone()).collect();
        let slots: Vec<Option<String>> = doc
            .entries()
            .iter()
            .map(|(_, v)| self.read_id(&resolver, v))
            .collect();

        let values = self.resolve_slots(model, &slots)?;
        let entries = keys.into_iter().zip(values).collect();

        Ok(FieldValue::Map(entries))
    }
}

impl Decoder for RefListDecoder<'_> {
    fn field(&self) -> &'static FieldModel {
        self.field
    }

    fn decode(&self, target: &mut dyn Entity) -> Result<(), DecodeError> {
        let model = target_of(&self.field.kind)?;

        let value = if coercion::is_map(&self.field.kind) {
            self.decode_map(model)?
        } else {
            self.decode_sequence(model)?
        };

        self.set(target, value)
    }
}
