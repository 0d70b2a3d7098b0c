mod compare;
mod document;
mod field;


use crate::types::{Blob, Date, ObjectId};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

// re-exports
pub use compare::canonical_cmp;
pub use document::Document;
pub use field::{FieldSetError, FieldValue, FromFieldValue, IntoFieldValue};

///
/// DbRef
///
/// The store's native cross-document reference: a collection name plus the
/// target's key in that collection's native key type.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DbRef {
    pub collection: String,
    pub id: Box<Value>,
}

impl DbRef {
    pub fn new(collection: impl Into<String>, id: impl Into<Value>) -> Self {
        Self {
            collection: collection.into(),
            id: Box::new(id.into()),
        }
    }
}

impl fmt::Display for DbRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.collection, self.id)
    }
}

///
/// Value
///
/// A document value as the store hands it back. Numbers arrive in the
/// store's default widths (`Int32`, `Int64`, `Double`); anything narrower is
/// the decoder's business.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    Text(String),
    Date(Date),
    Binary(Blob),
    ObjectId(ObjectId),
    Ref(DbRef),
    List(Vec<Self>),
    Document(Document),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short type label for diagnostics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::Double(_) => "double",
            Self::Text(_) => "text",
            Self::Date(_) => "date",
            Self::Binary(_) => "binary",
            Self::ObjectId(_) => "object_id",
            Self::Ref(_) => "ref",
            Self::List(_) => "list",
            Self::Document(_) => "document",
        }
    }

    ///
    /// STRING FORM
    ///

    /// Canonical textual rendering of a scalar.
    ///
    /// Narrow numeric fields are re-parsed from this form, so integral
    /// doubles render without a fractional part (`3.0` renders as `"3"`).
    /// References render as their key. Containers and binaries have none.
    #[must_use]
    pub fn string_form(&self) -> Option<String> {
        match self {
            Self::Bool(v) => Some(v.to_string()),
            Self::Int32(v) => Some(v.to_string()),
            Self::Int64(v) => Some(v.to_string()),
            Self::Double(v) => Some(v.to_string()),
            Self::Text(v) => Some(v.clone()),
            Self::Date(v) => Some(v.get().to_string()),
            Self::ObjectId(v) => Some(v.to_string()),
            Self::Ref(r) => r.id.string_form(),
            Self::Null | Self::Binary(_) | Self::List(_) | Self::Document(_) => None,
        }
    }

    ///
    /// ACCESSORS
    ///

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_list(&self) -> Option<&Vec<Self>> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Numeric view used by comparisons; `None` for non-numbers.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int32(v) => Some(*v as f64),
            Self::Int64(v) => Some(*v as f64),
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Equality the way the store applies a filter: numbers compare across
    /// widths, and a list matches if any element matches.
    #[must_use]
    pub fn matches(&self, needle: &Self) -> bool {
        if let Self::List(items) = self
            && !matches!(needle, Self::List(_))
        {
            return items.iter().any(|item| item.matches(needle));
        }

        canonical_cmp(self, needle) == Ordering::Equal
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Date(d) => write!(f, "{d}"),
            Self::Ref(r) => write!(f, "{r}"),
            Self::Binary(b) => write!(f, "<{} bytes>", b.len()),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Document(doc) => write!(f, "{doc}"),
            other => write!(f, "{}", other.string_form().unwrap_or_default()),
        }
    }
}

///
/// CONVERSIONS
///

macro_rules! impl_from_for_value {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for_value! {
    bool => Bool,
    i32 => Int32,
    i64 => Int64,
    f64 => Double,
    String => Text,
    &str => Text,
    Date => Date,
    Blob => Binary,
    ObjectId => ObjectId,
    DbRef => Ref,
    Document => Document,
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
