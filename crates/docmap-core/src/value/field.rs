use crate::{
    traits::Entity,
    types::{Blob, Date, ObjectId, Timestamp},
};
use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
    hash::Hash,
};
use thiserror::Error as ThisError;

///
/// FieldSetError
///
/// Raised when a typed field refuses a decoded value.
///

#[derive(Debug, ThisError)]
pub enum FieldSetError {
    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid {expected} '{text}'")]
    Invalid { expected: &'static str, text: String },

    #[error("field '{field}': {source}")]
    InField {
        field: &'static str,
        source: Box<Self>,
    },
}

impl FieldSetError {
    #[must_use]
    pub const fn mismatch(expected: &'static str, found: &FieldValue) -> Self {
        Self::TypeMismatch {
            expected,
            found: found.label(),
        }
    }

    /// Attach the field name, once.
    #[must_use]
    pub fn in_field(self, field: &'static str) -> Self {
        match self {
            Self::UnknownField { .. } | Self::InField { .. } => self,
            other => Self::InField {
                field,
                source: Box::new(other),
            },
        }
    }
}

///
/// FieldValue
///
/// Typed projection of a stored value, shaped by the declared field kind.
/// This is what decoders hand to `FieldValues::set_value`.
///

#[derive(Debug)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Text(String),
    Date(Date),
    Timestamp(Timestamp),
    Blob(Blob),
    Array(Vec<Self>),
    List(Vec<Self>),
    Set(Vec<Self>),
    Queue(Vec<Self>),
    Map(Vec<(String, Self)>),
    Entity(Box<dyn Entity>),
}

impl FieldValue {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Char(_) => "char",
            Self::Byte(_) => "byte",
            Self::Short(_) => "short",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Text(_) => "text",
            Self::Date(_) => "date",
            Self::Timestamp(_) => "timestamp",
            Self::Blob(_) => "blob",
            Self::Array(_) => "array",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Queue(_) => "queue",
            Self::Map(_) => "map",
            Self::Entity(_) => "entity",
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_entity(&self) -> Option<&dyn Entity> {
        match self {
            Self::Entity(e) => Some(&**e),
            _ => None,
        }
    }

    /// Elements of any sequence shape.
    #[must_use]
    pub fn as_elements(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) | Self::List(items) | Self::Set(items) | Self::Queue(items) => {
                Some(items)
            }
            _ => None,
        }
    }

    fn into_elements(self, expected: &'static str) -> Result<Vec<Self>, FieldSetError> {
        match self {
            Self::Array(items) | Self::List(items) | Self::Set(items) | Self::Queue(items) => {
                Ok(items)
            }
            other => Err(FieldSetError::mismatch(expected, &other)),
        }
    }

    /// Downcast a decoded entity back to its concrete type.
    pub fn into_entity<T: Entity>(self) -> Result<T, FieldSetError> {
        match self {
            Self::Entity(entity) => {
                let found = entity.model().path;
                entity
                    .into_any()
                    .downcast::<T>()
                    .map(|boxed| *boxed)
                    .map_err(|_| FieldSetError::TypeMismatch {
                        expected: "entity",
                        found,
                    })
            }
            other => Err(FieldSetError::mismatch("entity", &other)),
        }
    }
}

impl Clone for FieldValue {
    fn clone(&self) -> Self {
        match self {
            Self::Null => Self::Null,
            Self::Bool(v) => Self::Bool(*v),
            Self::Char(v) => Self::Char(*v),
            Self::Byte(v) => Self::Byte(*v),
            Self::Short(v) => Self::Short(*v),
            Self::Int(v) => Self::Int(*v),
            Self::Long(v) => Self::Long(*v),
            Self::Float(v) => Self::Float(*v),
            Self::Double(v) => Self::Double(*v),
            Self::Text(v) => Self::Text(v.clone()),
            Self::Date(v) => Self::Date(*v),
            Self::Timestamp(v) => Self::Timestamp(*v),
            Self::Blob(v) => Self::Blob(v.clone()),
            Self::Array(v) => Self::Array(v.clone()),
            Self::List(v) => Self::List(v.clone()),
            Self::Set(v) => Self::Set(v.clone()),
            Self::Queue(v) => Self::Queue(v.clone()),
            Self::Map(v) => Self::Map(v.clone()),
            Self::Entity(e) => Self::Entity(e.clone_entity()),
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::Short(a), Self::Short(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            (Self::Blob(a), Self::Blob(b)) => a == b,
            (Self::Array(a), Self::Array(b))
            | (Self::List(a), Self::List(b))
            | (Self::Set(a), Self::Set(b))
            | (Self::Queue(a), Self::Queue(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Entity(a), Self::Entity(b)) => entity_eq(&**a, &**b),
            _ => false,
        }
    }
}

// Two entities are equal when they share a model and every declared field
// reads back equal.
fn entity_eq(left: &dyn Entity, right: &dyn Entity) -> bool {
    let model = left.model();
    if model.path != right.model().path {
        return false;
    }

    model
        .lineage()
        .flat_map(|m| m.fields)
        .all(|field| left.get_value(field.name) == right.get_value(field.name))
}

///
/// FromFieldValue
///

pub trait FromFieldValue: Sized {
    fn from_field_value(value: FieldValue) -> Result<Self, FieldSetError>;
}

///
/// IntoFieldValue
///

pub trait IntoFieldValue {
    fn to_field_value(&self) -> FieldValue;
}

///
/// SCALARS
///

macro_rules! impl_copy_field_value {
    ( $( $type:ty => $variant:ident, $label:literal ),* $(,)? ) => {
        $(
            impl IntoFieldValue for $type {
                fn to_field_value(&self) -> FieldValue {
                    FieldValue::$variant(*self)
                }
            }

            impl FromFieldValue for $type {
                fn from_field_value(value: FieldValue) -> Result<Self, FieldSetError> {
                    match value {
                        FieldValue::$variant(v) => Ok(v),
                        other => Err(FieldSetError::mismatch($label, &other)),
                    }
                }
            }
        )*
    };
}

impl_copy_field_value! {
    bool => Bool, "bool",
    char => Char, "char",
    i8 => Byte, "byte",
    f32 => Float, "float",
    Date => Date, "date",
}

// Integers and doubles accept lossless widening from narrower kinds.
macro_rules! impl_widening_field_value {
    ( $( $type:ty => $variant:ident, $label:literal, [ $( $from:ident ),* ] );* $(;)? ) => {
        $(
            impl IntoFieldValue for $type {
                fn to_field_value(&self) -> FieldValue {
                    FieldValue::$variant(*self)
                }
            }

            impl FromFieldValue for $type {
                fn from_field_value(value: FieldValue) -> Result<Self, FieldSetError> {
                    match value {
                        FieldValue::$variant(v) => Ok(v),
                        $( FieldValue::$from(v) => Ok(<$type>::from(v)), )*
                        other => Err(FieldSetError::mismatch($label, &other)),
                    }
                }
            }
        )*
    };
}

impl_widening_field_value! {
    i16 => Short, "short", [Byte];
    i32 => Int, "int", [Byte, Short];
    i64 => Long, "long", [Byte, Short, Int];
    f64 => Double, "double", [Float];
}

impl IntoFieldValue for Timestamp {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Timestamp(*self)
    }
}

impl FromFieldValue for Timestamp {
    fn from_field_value(value: FieldValue) -> Result<Self, FieldSetError> {
        match value {
            FieldValue::Timestamp(v) => Ok(v),
            FieldValue::Date(d) => Ok(Self::from(d)),
            other => Err(FieldSetError::mismatch("timestamp", &other)),
        }
    }
}

impl IntoFieldValue for String {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }
}

impl FromFieldValue for String {
    fn from_field_value(value: FieldValue) -> Result<Self, FieldSetError> {
        match value {
            FieldValue::Text(v) => Ok(v),
            other => Err(FieldSetError::mismatch("text", &other)),
        }
    }
}

impl IntoFieldValue for Blob {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Blob(self.clone())
    }
}

impl FromFieldValue for Blob {
    fn from_field_value(value: FieldValue) -> Result<Self, FieldSetError> {
        match value {
            FieldValue::Blob(v) => Ok(v),
            other => Err(FieldSetError::mismatch("blob", &other)),
        }
    }
}

impl IntoFieldValue for ObjectId {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.to_string())
    }
}

impl FromFieldValue for ObjectId {
    fn from_field_value(value: FieldValue) -> Result<Self, FieldSetError> {
        match value {
            FieldValue::Text(text) => text.parse().map_err(|_| FieldSetError::Invalid {
                expected: "object id",
                text,
            }),
            other => Err(FieldSetError::mismatch("object id", &other)),
        }
    }
}

///
/// WRAPPERS
///

impl<T: IntoFieldValue> IntoFieldValue for Option<T> {
    fn to_field_value(&self) -> FieldValue {
        self.as_ref().map_or(FieldValue::Null, IntoFieldValue::to_field_value)
    }
}

impl<T: FromFieldValue> FromFieldValue for Option<T> {
    fn from_field_value(value: FieldValue) -> Result<Self, FieldSetError> {
        match value {
            FieldValue::Null => Ok(None),
            other => T::from_field_value(other).map(Some),
        }
    }
}

impl<T: IntoFieldValue> IntoFieldValue for Box<T> {
    fn to_field_value(&self) -> FieldValue {
        (**self).to_field_value()
    }
}

impl<T: FromFieldValue> FromFieldValue for Box<T> {
    fn from_field_value(value: FieldValue) -> Result<Self, FieldSetError> {
        T::from_field_value(value).map(Box::new)
    }
}

impl IntoFieldValue for Box<dyn Entity> {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Entity(self.clone_entity())
    }
}

impl FromFieldValue for Box<dyn Entity> {
    fn from_field_value(value: FieldValue) -> Result<Self, FieldSetError> {
        match value {
            FieldValue::Entity(e) => Ok(e),
            other => Err(FieldSetError::mismatch("entity", &other)),
        }
    }
}

///
/// COLLECTIONS
///

fn collect_elements<T, C>(value: FieldValue, expected: &'static str) -> Result<C, FieldSetError>
where
    T: FromFieldValue,
    C: FromIterator<T>,
{
    value
        .into_elements(expected)?
        .into_iter()
        .map(T::from_field_value)
        .collect()
}

fn collect_entries<T, C>(value: FieldValue) -> Result<C, FieldSetError>
where
    T: FromFieldValue,
    C: FromIterator<(String, T)>,
{
    match value {
        FieldValue::Map(entries) => entries
            .into_iter()
            .map(|(k, v)| T::from_field_value(v).map(|v| (k, v)))
            .collect(),
        other => Err(FieldSetError::mismatch("map", &other)),
    }
}

impl<T: IntoFieldValue> IntoFieldValue for Vec<T> {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::List(self.iter().map(IntoFieldValue::to_field_value).collect())
    }
}

impl<T: FromFieldValue> FromFieldValue for Vec<T> {
    fn from_field_value(value: FieldValue) -> Result<Self, FieldSetError> {
        collect_elements(value, "list")
    }
}

impl<T: IntoFieldValue> IntoFieldValue for VecDeque<T> {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Queue(self.iter().map(IntoFieldValue::to_field_value).collect())
    }
}

impl<T: FromFieldValue> FromFieldValue for VecDeque<T> {
    fn from_field_value(value: FieldValue) -> Result<Self, FieldSetError> {
        collect_elements(value, "queue")
    }
}

impl<T: IntoFieldValue, S> IntoFieldValue for HashSet<T, S> {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Set(self.iter().map(IntoFieldValue::to_field_value).collect())
    }
}

impl<T, S> FromFieldValue for HashSet<T, S>
where
    T: FromFieldValue + Eq + Hash,
    S: std::hash::BuildHasher + Default,
{
    fn from_field_value(value: FieldValue) -> Result<Self, FieldSetError> {
        collect_elements(value, "set")
    }
}

impl<T: IntoFieldValue> IntoFieldValue for BTreeSet<T> {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Set(self.iter().map(IntoFieldValue::to_field_value).collect())
    }
}

impl<T: FromFieldValue + Ord> FromFieldValue for BTreeSet<T> {
    fn from_field_value(value: FieldValue) -> Result<Self, FieldSetError> {
        collect_elements(value, "set")
    }
}

impl<T: IntoFieldValue, S> IntoFieldValue for HashMap<String, T, S> {
    fn to_field_value(&self) -> FieldValue {
        let mut entries: Vec<_> = self
            .iter()
            .map(|(k, v)| (k.clone(), v.to_field_value()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        FieldValue::Map(entries)
    }
}

impl<T, S> FromFieldValue for HashMap<String, T, S>
where
    T: FromFieldValue,
    S: std::hash::BuildHasher + Default,
{
    fn from_field_value(value: FieldValue) -> Result<Self, FieldSetError> {
        collect_entries(value)
    }
}

impl<T: IntoFieldValue> IntoFieldValue for BTreeMap<String, T> {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Map(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_field_value()))
                .collect(),
        )
    }
}

impl<T: FromFieldValue> FromFieldValue for BTreeMap<String, T> {
    fn from_field_value(value: FieldValue) -> Result<Self, FieldSetError> {
        collect_entries(value)
    }
}
