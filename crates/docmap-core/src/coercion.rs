//! Type coercion rules.
//!
//! The single place that knows how a declared field kind relates to the
//! values the store keeps. Decoders ask these predicates which conversion
//! path applies; the encoder uses `widen_scalar` for the way back.
//!
//! The store keeps numbers at a wide default width (`Int32`, `Int64`,
//! `Double`). Narrow kinds (byte, short, float) are always re-parsed from
//! the stored value's string form and never assumed to fit.

use crate::{
    model::field::{FieldKind, ScalarKind},
    types::{Date, Timestamp},
    value::{FieldValue, Value},
};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// CoercionError
///

#[derive(Debug, ThisError)]
pub enum CoercionError {
    #[error("null is not a valid {expected}")]
    UnexpectedNull { expected: &'static str },

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot parse '{text}' as {expected}")]
    Parse { expected: &'static str, text: String },

    #[error("'{text}' is out of range for {expected}")]
    OutOfRange { expected: &'static str, text: String },

    #[error("{kind} is not a scalar kind")]
    Unsupported { kind: String },
}

///
/// TypeClass
/// Semantic classification of a declared field kind.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TypeClass {
    Text,
    Scalar(ScalarKind),
    BoxedScalar(ScalarKind),
    Date,
    Timestamp,
    Blob,
    Array,
    List,
    Set,
    Queue,
    Map,
    Entity,
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Scalar(s) => write!(f, "{s}"),
            Self::BoxedScalar(s) => write!(f, "{s}?"),
            Self::Date => write!(f, "date"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::Blob => write!(f, "blob"),
            Self::Array => write!(f, "array"),
            Self::List => write!(f, "list"),
            Self::Set => write!(f, "set"),
            Self::Queue => write!(f, "queue"),
            Self::Map => write!(f, "map"),
            Self::Entity => write!(f, "entity"),
        }
    }
}

#[must_use]
pub const fn classify(kind: &FieldKind) -> TypeClass {
    match kind {
        FieldKind::Text => TypeClass::Text,
        FieldKind::Primitive(s) => TypeClass::Scalar(*s),
        FieldKind::Boxed(s) => TypeClass::BoxedScalar(*s),
        FieldKind::Date => TypeClass::Date,
        FieldKind::Timestamp => TypeClass::Timestamp,
        FieldKind::Blob => TypeClass::Blob,
        FieldKind::Array(_) => TypeClass::Array,
        FieldKind::List(_) => TypeClass::List,
        FieldKind::Set(_) => TypeClass::Set,
        FieldKind::Queue(_) => TypeClass::Queue,
        FieldKind::Map(_) => TypeClass::Map,
        FieldKind::Entity(_) => TypeClass::Entity,
    }
}

///
/// PREDICATES
///

#[must_use]
pub const fn is_array(kind: &FieldKind) -> bool {
    matches!(kind, FieldKind::Array(_))
}

#[must_use]
pub const fn is_list(kind: &FieldKind) -> bool {
    matches!(kind, FieldKind::List(_))
}

#[must_use]
pub const fn is_set(kind: &FieldKind) -> bool {
    matches!(kind, FieldKind::Set(_))
}

#[must_use]
pub const fn is_queue(kind: &FieldKind) -> bool {
    matches!(kind, FieldKind::Queue(_))
}

#[must_use]
pub const fn is_map(kind: &FieldKind) -> bool {
    matches!(kind, FieldKind::Map(_))
}

/// Array, list, set or queue: anything stored as an ordered sequence.
#[must_use]
pub const fn is_sequence(kind: &FieldKind) -> bool {
    is_array(kind) || is_list(kind) || is_set(kind) || is_queue(kind)
}

/// Wrap decoded elements in the collection shape `kind` declares.
#[must_use]
pub fn rebuild_sequence(kind: &FieldKind, items: Vec<FieldValue>) -> FieldValue {
    match classify(kind) {
        TypeClass::Array => FieldValue::Array(items),
        TypeClass::Set => FieldValue::Set(items),
        TypeClass::Queue => FieldValue::Queue(items),
        _ => FieldValue::List(items),
    }
}

///
/// DECODE DIRECTION
///

/// Coerce one stored scalar into the declared scalar kind.
pub fn coerce_scalar(kind: &FieldKind, raw: &Value) -> Result<FieldValue, CoercionError> {
    if raw.is_null() {
        return match kind {
            FieldKind::Primitive(s) => Err(CoercionError::UnexpectedNull {
                expected: s.label(),
            }),
            _ => Ok(FieldValue::Null),
        };
    }

    match classify(kind) {
        TypeClass::Text => coerce_text(raw),
        TypeClass::Scalar(s) | TypeClass::BoxedScalar(s) => coerce_primitive(s, raw),
        TypeClass::Date => coerce_date(raw).map(FieldValue::Date),
        TypeClass::Timestamp => coerce_timestamp(raw).map(FieldValue::Timestamp),
        TypeClass::Blob => match raw {
            Value::Binary(b) => Ok(FieldValue::Blob(b.clone())),
            other => Err(mismatch("blob", other)),
        },
        _ => Err(CoercionError::Unsupported {
            kind: kind.to_string(),
        }),
    }
}

fn coerce_text(raw: &Value) -> Result<FieldValue, CoercionError> {
    match raw {
        Value::Text(s) => Ok(FieldValue::Text(s.clone())),
        Value::ObjectId(id) => Ok(FieldValue::Text(id.to_string())),
        other => Err(mismatch("text", other)),
    }
}

fn coerce_primitive(kind: ScalarKind, raw: &Value) -> Result<FieldValue, CoercionError> {
    let expected = kind.label();

    match kind {
        ScalarKind::Bool => match raw {
            Value::Bool(b) => Ok(FieldValue::Bool(*b)),
            Value::Text(_) => reparse(raw, expected).map(FieldValue::Bool),
            other => Err(mismatch(expected, other)),
        },
        ScalarKind::Char => {
            let text = string_form(raw, expected)?;
            text.chars()
                .next()
                .map(FieldValue::Char)
                .ok_or(CoercionError::Parse { expected, text })
        }
        ScalarKind::Byte => reparse_int(raw, expected).map(FieldValue::Byte),
        ScalarKind::Short => reparse_int(raw, expected).map(FieldValue::Short),
        ScalarKind::Int => match raw {
            Value::Int32(v) => Ok(FieldValue::Int(*v)),
            Value::Int64(v) => cast(*v, expected).map(FieldValue::Int),
            _ => reparse_int(raw, expected).map(FieldValue::Int),
        },
        ScalarKind::Long => match raw {
            Value::Int32(v) => Ok(FieldValue::Long(i64::from(*v))),
            Value::Int64(v) => Ok(FieldValue::Long(*v)),
            _ => reparse_int(raw, expected).map(FieldValue::Long),
        },
        ScalarKind::Float => {
            let text = string_form(raw, expected)?;
            let v: f32 = parse(&text, expected)?;
            if v.is_infinite() && !text.to_ascii_lowercase().contains("inf") {
                return Err(CoercionError::OutOfRange { expected, text });
            }
            Ok(FieldValue::Float(v))
        }
        ScalarKind::Double => match raw {
            Value::Double(v) => Ok(FieldValue::Double(*v)),
            Value::Int32(v) => Ok(FieldValue::Double(f64::from(*v))),
            Value::Int64(v) => cast(*v, expected).map(FieldValue::Double),
            _ => reparse(raw, expected).map(FieldValue::Double),
        },
    }
}

fn coerce_date(raw: &Value) -> Result<Date, CoercionError> {
    match raw {
        Value::Date(d) => Ok(*d),
        Value::Int64(ms) => Ok(Date::from_millis(*ms)),
        Value::Text(s) => Date::parse_rfc3339(s).map_err(|_| CoercionError::Parse {
            expected: "date",
            text: s.clone(),
        }),
        other => Err(mismatch("date", other)),
    }
}

// A stored date is promoted; the store has no finer instant.
fn coerce_timestamp(raw: &Value) -> Result<Timestamp, CoercionError> {
    match raw {
        Value::Text(s) => Timestamp::parse_rfc3339(s).map_err(|_| CoercionError::Parse {
            expected: "timestamp",
            text: s.clone(),
        }),
        other => coerce_date(other)
            .map(Timestamp::from)
            .map_err(|_| mismatch("timestamp", other)),
    }
}

///
/// ENCODE DIRECTION
///

/// Widen a decoded scalar to the store's default width. `None` for values
/// that are not scalars.
#[must_use]
pub fn widen_scalar(value: &FieldValue) -> Option<Value> {
    let widened = match value {
        FieldValue::Null => Value::Null,
        FieldValue::Bool(v) => Value::Bool(*v),
        FieldValue::Char(c) => Value::Text(c.to_string()),
        FieldValue::Byte(v) => Value::Int32(i32::from(*v)),
        FieldValue::Short(v) => Value::Int32(i32::from(*v)),
        FieldValue::Int(v) => Value::Int32(*v),
        FieldValue::Long(v) => Value::Int64(*v),
        FieldValue::Float(v) => Value::Double(f64::from(*v)),
        FieldValue::Double(v) => Value::Double(*v),
        FieldValue::Text(s) => Value::Text(s.clone()),
        FieldValue::Date(d) => Value::Date(*d),
        FieldValue::Timestamp(t) => Value::Date(t.to_date()),
        FieldValue::Blob(b) => Value::Binary(b.clone()),
        _ => return None,
    };

    Some(widened)
}

///
/// HELPERS
///

fn mismatch(expected: &'static str, found: &Value) -> CoercionError {
    CoercionError::TypeMismatch {
        expected,
        found: found.label(),
    }
}

fn string_form(raw: &Value, expected: &'static str) -> Result<String, CoercionError> {
    raw.string_form().ok_or_else(|| mismatch(expected, raw))
}

fn parse<T: FromStr>(text: &str, expected: &'static str) -> Result<T, CoercionError> {
    text.trim().parse().map_err(|_| CoercionError::Parse {
        expected,
        text: text.to_string(),
    })
}

fn reparse<T: FromStr>(raw: &Value, expected: &'static str) -> Result<T, CoercionError> {
    let text = string_form(raw, expected)?;

    parse(&text, expected)
}

// Integer re-parse that tells an out-of-range number from garbage.
fn reparse_int<T: FromStr>(raw: &Value, expected: &'static str) -> Result<T, CoercionError> {
    let text = string_form(raw, expected)?;

    text.trim().parse().map_err(|_| {
        if text.trim().parse::<i128>().is_ok() {
            CoercionError::OutOfRange { expected, text }
        } else {
            CoercionError::Parse { expected, text }
        }
    })
}

fn cast<T: crate::traits::NumCast>(v: i64, expected: &'static str) -> Result<T, CoercionError> {
    <T as crate::traits::NumCast>::from(v).ok_or_else(|| CoercionError::OutOfRange {
        expected,
        text: v.to_string(),
    })
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_fixtures::SHORT_KIND, types::Blob};
    use proptest::prelude::*;

    const BYTE: FieldKind = FieldKind::Primitive(ScalarKind::Byte);
    const SHORT: FieldKind = FieldKind::Primitive(ScalarKind::Short);
    const INT: FieldKind = FieldKind::Primitive(ScalarKind::Int);
    const LONG: FieldKind = FieldKind::Primitive(ScalarKind::Long);
    const FLOAT: FieldKind = FieldKind::Primitive(ScalarKind::Float);
    const DOUBLE: FieldKind = FieldKind::Primitive(ScalarKind::Double);
    const CHAR: FieldKind = FieldKind::Primitive(ScalarKind::Char);
    const BOXED_INT: FieldKind = FieldKind::Boxed(ScalarKind::Int);

    #[test]
    fn classify_covers_every_kind() {
        assert_eq!(classify(&FieldKind::Text), TypeClass::Text);
        assert_eq!(classify(&BOXED_INT), TypeClass::BoxedScalar(ScalarKind::Int));
        assert_eq!(classify(&FieldKind::Array(&SHORT_KIND)), TypeClass::Array);
        assert_eq!(classify(&FieldKind::Queue(&SHORT_KIND)), TypeClass::Queue);
        assert!(is_sequence(&FieldKind::Set(&SHORT_KIND)));
        assert!(!is_sequence(&FieldKind::Map(&SHORT_KIND)));
        assert_eq!(classify(&CHAR), TypeClass::Scalar(ScalarKind::Char));
        assert_eq!(classify(&FieldKind::Blob), TypeClass::Blob);
    }

    #[test]
    fn narrow_kinds_reparse_wide_numbers() {
        assert_eq!(coerce_scalar(&BYTE, &Value::Int32(7)).unwrap(), FieldValue::Byte(7));
        assert_eq!(
            coerce_scalar(&SHORT, &Value::Double(300.0)).unwrap(),
            FieldValue::Short(300)
        );
        assert_eq!(
            coerce_scalar(&FLOAT, &Value::Double(0.5)).unwrap(),
            FieldValue::Float(0.5)
        );
    }

    #[test]
    fn wide_kinds_accept_int32_and_checked_int64() {
        assert_eq!(coerce_scalar(&LONG, &Value::Int32(-7)).unwrap(), FieldValue::Long(-7));
        assert_eq!(coerce_scalar(&DOUBLE, &Value::Int32(3)).unwrap(), FieldValue::Double(3.0));
        assert_eq!(coerce_scalar(&INT, &Value::Int64(42)).unwrap(), FieldValue::Int(42));
        assert!(matches!(
            coerce_scalar(&INT, &Value::Int64(i64::MAX)),
            Err(CoercionError::OutOfRange { .. })
        ));
        assert_eq!(widen_scalar(&FieldValue::Short(-2)), Some(Value::Int32(-2)));
        assert_eq!(widen_scalar(&FieldValue::Float(0.25)), Some(Value::Double(0.25)));
    }

    #[test]
    fn narrow_kinds_reject_values_that_do_not_fit() {
        assert!(matches!(
            coerce_scalar(&BYTE, &Value::Int32(300)),
            Err(CoercionError::OutOfRange { .. })
        ));
        assert!(matches!(
            coerce_scalar(&SHORT, &Value::Double(1.5)),
            Err(CoercionError::Parse { .. })
        ));
        assert!(matches!(
            coerce_scalar(&INT, &Value::Int64(i64::MAX)),
            Err(CoercionError::OutOfRange { .. })
        ));
        assert!(matches!(
            coerce_scalar(&FLOAT, &Value::Double(1e300)),
            Err(CoercionError::OutOfRange { .. })
        ));
    }

    #[test]
    fn null_only_fails_primitive_kinds() {
        assert!(matches!(
            coerce_scalar(&INT, &Value::Null),
            Err(CoercionError::UnexpectedNull { expected: "int" })
        ));
        assert_eq!(coerce_scalar(&BOXED_INT, &Value::Null).unwrap(), FieldValue::Null);
        assert_eq!(
            coerce_scalar(&FieldKind::Text, &Value::Null).unwrap(),
            FieldValue::Null
        );
    }

    #[test]
    fn char_takes_the_first_character() {
        assert_eq!(
            coerce_scalar(&CHAR, &Value::Text("xyz".into())).unwrap(),
            FieldValue::Char('x')
        );
        assert!(coerce_scalar(&CHAR, &Value::Text(String::new())).is_err());
    }

    #[test]
    fn stored_date_promotes_to_timestamp() {
        let date = Date::from_millis(1_700_000_000_000);
        let out = coerce_scalar(&FieldKind::Timestamp, &Value::Date(date)).unwrap();

        assert_eq!(out, FieldValue::Timestamp(Timestamp::from(date)));
    }

    #[test]
    fn text_does_not_accept_numbers() {
        assert!(matches!(
            coerce_scalar(&FieldKind::Text, &Value::Int32(1)),
            Err(CoercionError::TypeMismatch { expected: "text", found: "int32" })
        ));
    }

    #[test]
    fn blob_passes_through() {
        let blob = Blob::from(vec![1u8, 2, 3]);
        let out = coerce_scalar(&FieldKind::Blob, &Value::Binary(blob.clone())).unwrap();

        assert_eq!(out, FieldValue::Blob(blob));
    }

    #[test]
    fn collections_are_not_scalars() {
        assert!(matches!(
            coerce_scalar(&FieldKind::List(&SHORT_KIND), &Value::List(vec![])),
            Err(CoercionError::Unsupported { .. })
        ));
    }

    #[test]
    fn timestamps_truncate_to_store_precision() {
        let ts = Timestamp::from_nanos(1_234_567_890);

        assert_eq!(
            widen_scalar(&FieldValue::Timestamp(ts)),
            Some(Value::Date(Date::from_millis(1_234)))
        );
    }

    proptest! {
        #[test]
        fn byte_survives_widening(v in any::<i8>()) {
            let stored = widen_scalar(&FieldValue::Byte(v)).unwrap();
            prop_assert_eq!(coerce_scalar(&BYTE, &stored).unwrap(), FieldValue::Byte(v));
        }

        #[test]
        fn short_survives_widening(v in any::<i16>()) {
            let stored = widen_scalar(&FieldValue::Short(v)).unwrap();
            prop_assert_eq!(coerce_scalar(&SHORT, &stored).unwrap(), FieldValue::Short(v));
        }

        #[test]
        fn long_survives_widening(v in any::<i64>()) {
            let stored = widen_scalar(&FieldValue::Long(v)).unwrap();
            prop_assert_eq!(coerce_scalar(&LONG, &stored).unwrap(), FieldValue::Long(v));
        }

        #[test]
        fn float_survives_widening(v in proptest::num::f32::NORMAL | proptest::num::f32::ZERO) {
            let stored = widen_scalar(&FieldValue::Float(v)).unwrap();
            prop_assert_eq!(coerce_scalar(&FLOAT, &stored).unwrap(), FieldValue::Float(v));
        }

        #[test]
        fn double_survives_widening(v in proptest::num::f64::NORMAL) {
            let stored = widen_scalar(&FieldValue::Double(v)).unwrap();
            prop_assert_eq!(coerce_scalar(&DOUBLE, &stored).unwrap(), FieldValue::Double(v));
        }

        #[test]
        fn wide_int64_into_int_never_corrupts(v in any::<i64>()) {
            match coerce_scalar(&INT, &Value::Int64(v)) {
                Ok(FieldValue::Int(out)) => prop_assert_eq!(i64::from(out), v),
                Ok(other) => prop_assert!(false, "unexpected {:?}", other),
                Err(err) => {
                    prop_assert!(i32::try_from(v).is_err());
                    prop_assert!(matches!(err, CoercionError::OutOfRange { .. }), "{}", err);
                }
            }
        }
    }
}
