use crate::{
    decode::{DecodeError, Decoder},
    model::field::FieldModel,
    traits::Entity,
    value::{FieldValue, Value},
};

///
/// IdDecoder
///
/// Stored `_id` to the entity's string identifier, whatever native key
/// type the identity strategy produced.
///

pub struct IdDecoder<'a> {
    field: &'static FieldModel,
    raw: &'a Value,
}

impl<'a> IdDecoder<'a> {
    #[must_use]
    pub const fn new(field: &'static FieldModel, raw: &'a Value) -> Self {
        Self { field, raw }
    }
}

impl Decoder for IdDecoder<'_> {
    fn field(&self) -> &'static FieldModel {
        self.field
    }

    fn decode(&self, target: &mut dyn Entity) -> Result<(), DecodeError> {
        let id = match self.raw {
            Value::ObjectId(id) => id.to_string(),
            Value::Int64(n) => n.to_string(),
            Value::Int32(n) => n.to_string(),
            Value::Text(s) => s.clone(),
            other => return Err(DecodeError::shape("identifier", other)),
        };

        self.set(target, FieldValue::Text(id))
    }
}
