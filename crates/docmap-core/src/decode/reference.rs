use crate::{
    decode::{
        DecodeContext, DecodeError, Decoder,
        embed::{materialize, target_of},
    },
    model::{
        entity::EntityModel,
        field::{FieldModel, RefOptions},
    },
    reference::{ReferenceError, ReferenceResolver},
    store::Filter,
    traits::Entity,
    value::{FieldValue, Value},
};

/// Target instance carrying only its identifier. No store access.
pub(crate) fn stub(
    ctx: DecodeContext<'_>,
    model: &'static EntityModel,
    id: &str,
) -> Result<Box<dyn Entity>, DecodeError> {
    let id_field = ctx
        .registry
        .fields()
        .id_field(model)
        .map_err(ReferenceError::from)?;

    let mut entity = ctx.registry.create(model)?;
    entity.set_value(id_field.name, FieldValue::Text(id.to_string()))?;

    Ok(entity)
}

/// Fetch and decode one target; a dangling reference decodes to null.
/// A target already being fetched further up, or one past the cascade
/// depth limit, decodes to a stub.
pub(crate) fn fetch_one(
    ctx: DecodeContext<'_>,
    model: &'static EntityModel,
    id: &str,
) -> Result<FieldValue, DecodeError> {
    let resolver = ReferenceResolver::new(ctx.registry.fields());
    let key = resolver.to_db_id(model, id)?;

    if !ctx.can_cascade() || ctx.is_fetching(model.name, &key) {
        tracing::debug!(
            entity = model.path,
            id,
            depth = ctx.depth(),
            "cascade stopped at a stub"
        );
        return stub(ctx, model, id).map(FieldValue::Entity);
    }

    match ctx.store.find_one(model.name, &Filter::by_id(key.clone()))? {
        Some(doc) => {
            let trail = ctx.enter(model.name, key);
            materialize(ctx.within(&trail), model, &doc).map(FieldValue::Entity)
        }
        None => {
            tracing::debug!(entity = model.path, id, "dangling reference");
            Ok(FieldValue::Null)
        }
    }
}

///
/// RefDecoder
///
/// Single reference: a stub holding the target's id, or with cascade-read
/// the fully fetched target.
///

pub struct RefDecoder<'a> {
    field: &'static FieldModel,
    options: RefOptions,
    raw: &'a Value,
    ctx: DecodeContext<'a>,
}

impl<'a> RefDecoder<'a> {
    #[must_use]
    pub const fn new(
        field: &'static FieldModel,
        options: RefOptions,
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
}

impl Decoder for RefDecoder<'_> {
    fn field(&self) -> &'static FieldModel {
        self.field
    }

    fn decode(&self, target: &mut dyn Entity) -> Result<(), DecodeError> {
        let model = target_of(&self.field.kind)?;
        let resolver = ReferenceResolver::new(self.ctx.registry.fields());
        let id = resolver
            .from_reference(self.options.manual, self.raw)
            .ok_or(DecodeError::Unresolved)?;

        let value = if self.options.cascade_read {
            fetch_one(self.ctx, model, &id)?
        } else {
            FieldValue::Entity(stub(self.ctx, model, &id)?)
        };

        self.set(target, value)
    }
}
