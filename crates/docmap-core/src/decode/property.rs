use crate::{
    coercion::{self, CoercionError},
    decode::{DecodeError, Decoder},
    model::field::{FieldKind, FieldModel},
    traits::Entity,
    value::{FieldValue, Value},
};

///
/// PropertyDecoder
///
/// Plain values: scalars through the coercion rules, sequences rebuilt
/// element by element into their declared shape, string-keyed maps entry
/// by entry.
///

pub struct PropertyDecoder<'a> {
    field: &'static FieldModel,
    raw: &'a Value,
}

impl<'a> PropertyDecoder<'a> {
    #[must_use]
    pub const fn new(field: &'static FieldModel, raw: &'a Value) -> Self {
        Self { field, raw }
    }
}

impl Decoder for PropertyDecoder<'_> {
    fn field(&self) -> &'static FieldModel {
        self.field
    }

    fn decode(&self, target: &mut dyn Entity) -> Result<(), DecodeError> {
        let value = decode_property(&self.field.kind, self.raw)?;

        self.set(target, value)
    }
}

pub(crate) fn decode_property(kind: &FieldKind, raw: &Value) -> Result<FieldValue, DecodeError> {
    if coercion::is_sequence(kind) {
        let element = kind.element().ok_or(CoercionError::Unsupported {
            kind: kind.to_string(),
        })?;
        let items = raw
            .as_list()
            .ok_or_else(|| DecodeError::shape("list", raw))?;

        let decoded = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                decode_property(element, item).map_err(|err| DecodeError::element(i, err))
            })
            .collect::<Result<Vec<_>, _>>()?;

        return Ok(coercion::rebuild_sequence(kind, decoded));
    }

    if coercion::is_map(kind) {
        let element = kind.element().ok_or(CoercionError::Unsupported {
            kind: kind.to_string(),
        })?;
        let doc = raw
            .as_document()
            .ok_or_else(|| DecodeError::shape("document", raw))?;

        let entries = doc
            .entries()
            .iter()
            .map(|(k, v)| {
                decode_property(element, v)
                    .map(|v| (k.clone(), v))
                    .map_err(|err| DecodeError::entry(k, err))
            })
            .collect::<Result<Vec<_>, _>>()?;

        return Ok(FieldValue::Map(entries));
    }

    Ok(coercion::coerce_scalar(kind, raw)?)
}
