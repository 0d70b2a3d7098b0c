use crate::value::{Document, Value, canonical_cmp};
use std::{cmp::Ordering, fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// SortParseError
///

#[derive(Debug, ThisError)]
pub enum SortParseError {
    #[error("sort spec must be wrapped in braces: '{0}'")]
    MissingBraces(String),

    #[error("malformed sort entry '{0}'")]
    MalformedEntry(String),

    #[error("sort direction for '{field}' must be 1 or -1, found '{direction}'")]
    BadDirection { field: String, direction: String },
}

///
/// Direction
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

///
/// SortKey
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SortKey {
    pub field: String,
    pub direction: Direction,
}

///
/// SortSpec
///
/// Ordered sort keys, written `{'level': -1, 'name': 1}`. Quotes around
/// field names are optional. Missing fields sort as null.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    pub fn parse(spec: &str) -> Result<Self, SortParseError> {
        let trimmed = spec.trim();
        let inner = trimmed
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .ok_or_else(|| SortParseError::MissingBraces(spec.to_string()))?;

        let mut keys = Vec::new();
        for entry in inner.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (field, direction) = entry
                .split_once(':')
                .ok_or_else(|| SortParseError::MalformedEntry(entry.to_string()))?;

            let field = field.trim().trim_matches(|c| c == '\'' || c == '"');
            if field.is_empty() {
                return Err(SortParseError::MalformedEntry(entry.to_string()));
            }

            let direction = match direction.trim() {
                "1" => Direction::Asc,
                "-1" => Direction::Desc,
                other => {
                    return Err(SortParseError::BadDirection {
                        field: field.to_string(),
                        direction: other.to_string(),
                    });
                }
            };

            keys.push(SortKey {
                field: field.to_string(),
                direction,
            });
        }

        Ok(Self { keys })
    }

    #[must_use]
    pub fn ascending(field: impl Into<String>) -> Self {
        Self::default().then(field, Direction::Asc)
    }

    #[must_use]
    pub fn descending(field: impl Into<String>) -> Self {
        Self::default().then(field, Direction::Desc)
    }

    #[must_use]
    pub fn then(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.keys.push(SortKey {
            field: field.into(),
            direction,
        });
        self
    }

    #[must_use]
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[must_use]
    pub fn compare(&self, left: &Document, right: &Document) -> Ordering {
        let null = Value::Null;

        for key in &self.keys {
            let l = left.get(&key.field).unwrap_or(&null);
            let r = right.get(&key.field).unwrap_or(&null);

            let cmp = match key.direction {
                Direction::Asc => canonical_cmp(l, r),
                Direction::Desc => canonical_cmp(r, l),
            };
            if cmp != Ordering::Equal {
                return cmp;
            }
        }

        Ordering::Equal
    }
}

impl FromStr for SortSpec {
    type Err = SortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let dir = match key.direction {
                Direction::Asc => 1,
                Direction::Desc => -1,
            };
            write!(f, "'{}': {dir}", key.field)?;
        }
        write!(f, "}}")
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_and_bare_fields() {
        let spec = SortSpec::parse("{'level': -1, name: 1}").unwrap();

        assert_eq!(
            spec.keys(),
            [
                SortKey {
                    field: "level".into(),
                    direction: Direction::Desc
                },
                SortKey {
                    field: "name".into(),
                    direction: Direction::Asc
                },
            ]
        );
        assert_eq!(spec.to_string(), "{'level': -1, 'name': 1}");
    }

    #[test]
    fn empty_braces_are_an_empty_spec() {
        assert!(SortSpec::parse("{ }").unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            SortSpec::parse("level: -1"),
            Err(SortParseError::MissingBraces(_))
        ));
        assert!(matches!(
            SortSpec::parse("{'level'}"),
            Err(SortParseError::MalformedEntry(_))
        ));
        assert!(matches!(
            SortSpec::parse("{'level': 2}"),
            Err(SortParseError::BadDirection { .. })
        ));
    }

    #[test]
    fn compare_applies_keys_in_order() {
        let spec = SortSpec::descending("age").then("name", Direction::Asc);
        let a = Document::new().with("age", 30).with("name", "b");
        let b = Document::new().with("age", 30).with("name", "a");
        let c = Document::new().with("age", 40).with("name", "z");

        let mut docs = vec![a.clone(), b.clone(), c.clone()];
        docs.sort_by(|l, r| spec.compare(l, r));

        assert_eq!(docs, vec![c, b, a]);
    }
}
