use std::fmt::{self, Display};

///
/// Compare
/// Comparison applied by an index filter.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Compare {
    Is,
    NotEquals,
    Greater,
    GreaterEquals,
    Less,
    LessEquals,
    IsNull,
    NotNull,
}

impl Display for Compare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Is => "==",
            Self::NotEquals => "!=",
            Self::Greater => ">",
            Self::GreaterEquals => ">=",
            Self::Less => "<",
            Self::LessEquals => "<=",
            Self::IsNull => "is null",
            Self::NotNull => "is not null",
        };
        write!(f, "{label}")
    }
}

///
/// IndexFilter
///
/// Declares that an entity is only indexed while `field <compare> value`
/// holds. `value` is written as text and read in the field's own kind.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IndexFilter {
    pub field: &'static str,
    pub compare: Compare,
    pub value: &'static str,
}

impl IndexFilter {
    #[must_use]
    pub const fn new(field: &'static str, compare: Compare, value: &'static str) -> Self {
        Self {
            field,
            compare,
            value,
        }
    }
}

impl Display for IndexFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.compare {
            Compare::IsNull | Compare::NotNull => write!(f, "{} {}", self.field, self.compare),
            _ => write!(f, "{} {} {}", self.field, self.compare, self.value),
        }
    }
}
