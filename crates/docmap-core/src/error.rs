use crate::{cache::MetadataError, store::StoreError};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// What callers of the mapper, registry and listener see. Configuration
/// mistakes (missing identity, unknown field, unregistered type) and store
/// failures surface here; field-local decode failures never do.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Typed source, kept for the origins that have one.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct an encode-origin conversion error.
    pub(crate) fn encode_conversion(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Conversion, ErrorOrigin::Encode, message)
    }

    #[must_use]
    pub const fn is_missing_identity(&self) -> bool {
        matches!(
            self.detail,
            Some(ErrorDetail::Metadata(MetadataError::MissingIdentity { .. }))
        )
    }

    #[must_use]
    pub const fn is_unknown_field(&self) -> bool {
        matches!(
            self.detail,
            Some(ErrorDetail::Metadata(MetadataError::UnknownField { .. }))
        )
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

}

///
/// ErrorDetail
///
/// Source error behind an [`InternalError`], matching its origin.
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Metadata(MetadataError),
    #[error("{0}")]
    Store(StoreError),
}

impl From<MetadataError> for InternalError {
    fn from(err: MetadataError) -> Self {
        Self {
            class: err.class(),
            origin: ErrorOrigin::Metadata,
            message: err.to_string(),
            detail: Some(ErrorDetail::Metadata(err)),
        }
    }
}

impl From<StoreError> for InternalError {
    fn from(err: StoreError) -> Self {
        Self {
            class: ErrorClass::Internal,
            origin: ErrorOrigin::Store,
            message: err.to_string(),
            detail: Some(ErrorDetail::Store(err)),
        }
    }
}

///
/// ErrorClass
/// How a failure should be treated, independent of where it came from.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    NotFound,
    Internal,
    Unsupported,
    InvariantViolation,
    Conversion,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::Internal => "internal",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
            Self::Conversion => "conversion",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Subsystem that raised the failure.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Metadata,
    Registry,
    Decode,
    Encode,
    Reference,
    Store,
    Index,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Metadata => "metadata",
            Self::Registry => "registry",
            Self::Decode => "decode",
            Self::Encode => "encode",
            Self::Reference => "reference",
            Self::Store => "store",
            Self::Index => "index",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_errors_keep_their_detail() {
        let err: InternalError = MetadataError::MissingIdentity { entity: "x::Y" }.into();

        assert_eq!(err.class, ErrorClass::InvariantViolation);
        assert_eq!(err.origin, ErrorOrigin::Metadata);
        assert!(err.is_missing_identity());
        assert!(!err.is_unknown_field());
    }

    #[test]
    fn unknown_field_is_not_found() {
        let err: InternalError = MetadataError::UnknownField {
            entity: "x::Y",
            field: "z".into(),
        }
        .into();

        assert!(err.is_unknown_field());
        assert!(err.is_not_found());
    }

    #[test]
    fn store_errors_are_internal() {
        let err: InternalError = StoreError::Backend("down".into()).into();

        assert_eq!(err.class, ErrorClass::Internal);
        assert_eq!(err.to_string(), "store backend error: down");
        assert_eq!(format!("{}:{}", err.origin, err.class), "store:internal");
    }
}
