use crate::{
    coercion,
    decode::{DecodeContext, DecodeError, Decoder, decode_into},
    model::{
        entity::EntityModel,
        field::{FieldKind, FieldModel},
    },
    traits::Entity,
    value::{Document, FieldValue, Value},
};

/// Instantiate `model` and decode `doc` into it. Nested field failures are
/// logged by `decode_into` and do not fail the outer field.
pub(crate) fn materialize(
    ctx: DecodeContext<'_>,
    model: &'static EntityModel,
    doc: &Document,
) -> Result<Box<dyn Entity>, DecodeError> {
    let mut entity = ctx.registry.create(model)?;
    decode_into(ctx, entity.as_mut(), doc);

    Ok(entity)
}

pub(crate) fn target_of(kind: &FieldKind) -> Result<&'static EntityModel, DecodeError> {
    kind.entity_model().ok_or_else(|| DecodeError::NoTarget {
        kind: kind.to_string(),
    })
}

fn embedded(
    ctx: DecodeContext<'_>,
    model: &'static EntityModel,
    raw: &Value,
) -> Result<FieldValue, DecodeError> {
    let doc = raw
        .as_document()
        .ok_or_else(|| DecodeError::shape("document", raw))?;

    materialize(ctx, model, doc).map(FieldValue::Entity)
}

///
/// EmbedDecoder
///

pub struct EmbedDecoder<'a> {
    field: &'static FieldModel,
    raw: &'a Value,
    ctx: DecodeContext<'a>,
}

impl<'a> EmbedDecoder<'a> {
    #[must_use]
    pub const fn new(field: &'static FieldModel, raw: &'a Value, ctx: DecodeContext<'a>) -> Self {
        Self { field, raw, ctx }
    }
}

impl Decoder for EmbedDecoder<'_> {
    fn field(&self) -> &'static FieldModel {
        self.field
    }

    fn decode(&self, target: &mut dyn Entity) -> Result<(), DecodeError> {
        let model = target_of(&self.field.kind)?;
        let value = embedded(self.ctx, model, self.raw)?;

        self.set(target, value)
    }
}

///
/// EmbedListDecoder
///
/// Sequences of embedded documents, or a document of embedded documents for
/// map-shaped fields.
///

pub struct EmbedListDecoder<'a> {
    field: &'static FieldModel,
    raw: &'a Value,
    ctx: DecodeContext<'a>,
}

impl<'a> EmbedListDecoder<'a> {
    #[must_use]
    pub const fn new(field: &'static FieldModel, raw: &'a Value, ctx: DecodeContext<'a>) -> Self {
        Self { field, raw, ctx }
    }
}

impl Decoder for EmbedListDecoder<'_> {
    fn field(&self) -> &'static FieldModel {
        self.field
    }

    fn decode(&self, target: &mut dyn Entity) -> Result<(), DecodeError> {
        let kind = &self.field.kind;
        let model = target_of(kind)?;

        let value = if coercion::is_map(kind) {
            let doc = self
                .raw
                .as_document()
                .ok_or_else(|| DecodeError::shape("document", self.raw))?;

            let entries = doc
                .entries()
                .iter()
                .map(|(k, v)| {
                    embedded(self.ctx, model, v)
                        .map(|e| (k.clone(), e))
                        .map_err(|err| DecodeError::entry(k, err))
                })
                .collect::<Result<Vec<_>, _>>()?;

            FieldValue::Map(entries)
        } else {
            let items = self
                .raw
                .as_list()
                .ok_or_else(|| DecodeError::shape("list", self.raw))?;

            let decoded = items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    embedded(self.ctx, model, item).map_err(|err| DecodeError::element(i, err))
                })
                .collect::<Result<Vec<_>, _>>()?;

            coercion::rebuild_sequence(kind, decoded)
        };

        self.set(target, value)
    }
}
