use derive_more::{Deref, From};
use serde::{Deserialize, Serialize};

///
/// Blob
///
/// Opaque binary payload; serialized as a byte string rather than a
/// sequence of integers.
///

#[derive(
    Clone,
    Debug,
    Default,
    Deref,
    Deserialize,
    Eq,
    From,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[repr(transparent)]
pub struct Blob(#[serde(with = "serde_bytes")] Vec<u8>);

impl Blob {
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<&[u8]> for Blob {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}
