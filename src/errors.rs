//! Error types for the crate.
//!
//! This module defines the low-level [`RepresentationError`] raised while
//! encoding or restoring representation trees, as well as the crate-facing
//! [`Error`] returned by algebraic structures, bilinear groups and the factory.
//!
//! The errors are implemented with `thiserror` so they are easy to convert
//! and debug in higher-level code.
//!
//! # Examples
//!
//! ```rust
//! use bilinear::errors::{Error, RepresentationError};
//!
//! let err: Error = RepresentationError::UnknownType("zq".into()).into();
//! assert!(matches!(err, Error::Representation(_)));
//! ```

use thiserror::Error;

/// Errors raised by the representation codec and the type registry.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RepresentationError {
    #[error("malformed representation: expected {expected}, found {found}")]
    Malformed {
        expected: &'static str,
        found: &'static str,
    },
    #[error("missing field `{0}`")]
    MissingField(String),
    #[error("unexpected field `{0}`")]
    UnexpectedField(String),
    #[error("unknown constant `{name}` for enum {enum_name}")]
    UnknownConstant {
        enum_name: &'static str,
        name: String,
    },
    #[error("no restorer registered for type `{0}`")]
    UnknownType(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// High-level errors returned by structures, bilinear groups and the factory.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unsupported configuration: {0}")]
    UnsupportedConfig(String),
    #[error("representation error: {0}")]
    Representation(#[from] RepresentationError),
    #[error("point compression impossible: {0}")]
    CompressionImpossible(&'static str),
    #[error("element does not belong to {0}")]
    ForeignElement(&'static str),
    #[error("math error: {0}")]
    Math(&'static str),
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}
