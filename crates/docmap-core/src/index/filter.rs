use crate::{
    model::index::{Compare, IndexFilter},
    traits::Entity,
    types::{Date, Timestamp},
    value::FieldValue,
};
use std::cmp::Ordering;

/// Whether `entity` passes every index filter declared along its lineage.
/// An entity failing any filter is removed from the index instead.
#[must_use]
pub fn needs_index(entity: &dyn Entity) -> bool {
    entity
        .model()
        .lineage()
        .flat_map(|model| model.index_filters.iter())
        .all(|filter| holds(entity, filter))
}

fn holds(entity: &dyn Entity, filter: &IndexFilter) -> bool {
    let value = entity.get_value(filter.field).unwrap_or(FieldValue::Null);

    match filter.compare {
        Compare::IsNull => return value.is_null(),
        Compare::NotNull => return !value.is_null(),
        _ => {}
    }

    // null equals nothing
    if value.is_null() {
        return filter.compare == Compare::NotEquals;
    }

    let Some(ordering) = compare_to(&value, filter.value) else {
        tracing::warn!(
            entity = entity.model().path,
            field = filter.field,
            value = filter.value,
            found = value.label(),
            "index filter value not comparable"
        );
        return false;
    };

    match filter.compare {
        Compare::Is => ordering == Ordering::Equal,
        Compare::NotEquals => ordering != Ordering::Equal,
        Compare::Greater => ordering == Ordering::Greater,
        Compare::GreaterEquals => ordering != Ordering::Less,
        Compare::Less => ordering == Ordering::Less,
        Compare::LessEquals => ordering != Ordering::Greater,
        Compare::IsNull | Compare::NotNull => false,
    }
}

// Reads the filter text in the kind of the field's current value.
fn compare_to(value: &FieldValue, text: &str) -> Option<Ordering> {
    let text = text.trim();

    match value {
        FieldValue::Bool(v) => text.parse::<bool>().ok().map(|t| v.cmp(&t)),
        FieldValue::Char(c) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(t), None) => Some(c.cmp(&t)),
                _ => None,
            }
        }
        FieldValue::Byte(v) => compare_int(i64::from(*v), text),
        FieldValue::Short(v) => compare_int(i64::from(*v), text),
        FieldValue::Int(v) => compare_int(i64::from(*v), text),
        FieldValue::Long(v) => compare_int(*v, text),
        FieldValue::Float(v) => compare_float(f64::from(*v), text),
        FieldValue::Double(v) => compare_float(*v, text),
        FieldValue::Text(s) => Some(s.as_str().cmp(text)),
        FieldValue::Date(d) => Date::parse_rfc3339(text)
            .ok()
            .or_else(|| text.parse::<i64>().ok().map(Date::from_millis))
            .map(|t| d.cmp(&t)),
        FieldValue::Timestamp(ts) => Timestamp::parse_rfc3339(text).ok().map(|t| ts.cmp(&t)),
        _ => None,
    }
}

#[expect(clippy::cast_precision_loss)]
fn compare_int(value: i64, text: &str) -> Option<Ordering> {
    text.parse::<i64>().map_or_else(
        |_| compare_float(value as f64, text),
        |t| Some(value.cmp(&t)),
    )
}

fn compare_float(value: f64, text: &str) -> Option<Ordering> {
    text.parse::<f64>().ok().and_then(|t| value.partial_cmp(&t))
}

///
/// TESTS
///
