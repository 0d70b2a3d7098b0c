use crate::{
    ID_KEY,
    value::{Document, Value},
};
use std::fmt;

///
/// Filter
///
/// Equality-only query predicate. Equality against a stored list matches
/// when any element matches, the way the document store evaluates it.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Filter {
    #[default]
    All,
    Eq {
        field: String,
        value: Value,
    },
    In {
        field: String,
        values: Vec<Value>,
    },
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::In {
            field: field.into(),
            values,
        }
    }

    pub fn by_id(id: impl Into<Value>) -> Self {
        Self::eq(ID_KEY, id)
    }

    /// A null operand also matches a missing field.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Self::All => true,
            Self::Eq { field, value } => field_matches(doc, field, value),
            Self::In { field, values } => values.iter().any(|v| field_matches(doc, field, v)),
        }
    }
}

fn field_matches(doc: &Document, field: &str, needle: &Value) -> bool {
    doc.get(field)
        .map_or(needle.is_null(), |stored| stored.matches(needle))
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "{{}}"),
            Self::Eq { field, value } => write!(f, "{{{field}: {value}}}"),
            Self::In { field, values } => {
                write!(f, "{{{field}: {{$in: {}}}}}", Value::List(values.clone()))
            }
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::DbRef;

    #[test]
    fn eq_matches_scalars_and_list_elements() {
        let doc = Document::new()
            .with("name", "ann")
            .with("tags", vec!["a", "b"]);

        assert!(Filter::eq("name", "ann").matches(&doc));
        assert!(Filter::eq("tags", "b").matches(&doc));
        assert!(!Filter::eq("tags", "c").matches(&doc));
    }

    #[test]
    fn in_matches_any_value() {
        let doc = Document::new().with("_id", "P2");
        let filter = Filter::is_in("_id", vec!["P1".into(), "P2".into()]);

        assert!(filter.matches(&doc));
        assert!(!Filter::is_in("_id", vec![]).matches(&doc));
    }

    #[test]
    fn null_matches_missing_fields() {
        let doc = Document::new().with("name", "ann");

        assert!(Filter::eq("level", Value::Null).matches(&doc));
        assert!(!Filter::eq("name", Value::Null).matches(&doc));
    }

    #[test]
    fn references_compare_by_collection_and_key() {
        let doc = Document::new().with("author", DbRef::new("person", "P7"));

        assert!(Filter::eq("author", DbRef::new("person", "P7")).matches(&doc));
        assert!(!Filter::eq("author", DbRef::new("robot", "P7")).matches(&doc));
    }
}
