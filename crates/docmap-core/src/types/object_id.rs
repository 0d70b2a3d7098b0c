use derive_more::{Deref, Display};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use std::str::FromStr;
use thiserror::Error as ThisError;
use ulid::Ulid as WrappedUlid;

///
/// ObjectIdError
///

#[derive(Debug, ThisError)]
pub enum ObjectIdError {
    #[error("invalid object id '{text}': {reason}")]
    InvalidString { text: String, reason: String },
}

///
/// ObjectId
///
/// Store-generated opaque identifier. Backed by a ULID, so the canonical
/// string form is 26 Crockford base32 characters and ids sort by creation
/// time.
///

#[derive(Clone, Copy, Debug, Deref, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct ObjectId(WrappedUlid);

impl ObjectId {
    #[must_use]
    pub const fn nil() -> Self {
        Self(WrappedUlid::nil())
    }

    #[must_use]
    pub const fn from_parts(timestamp_ms: u64, random: u128) -> Self {
        Self(WrappedUlid::from_parts(timestamp_ms, random))
    }

    /// Generate a fresh id stamped with the current time.
    #[must_use]
    pub fn generate() -> Self {
        Self(WrappedUlid::new())
    }

    /// Creation time embedded in the id, in milliseconds.
    #[must_use]
    pub fn timestamp_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WrappedUlid::from_string(s)
            .map(Self)
            .map_err(|err| ObjectIdError::InvalidString {
                text: s.to_string(),
                reason: err.to_string(),
            })
    }
}

impl Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

///
/// TESTS
///
