use thiserror::Error;

use crate::path::KeyPath;

/// Errors produced by value conversion and path parsing.
#[derive(Debug, Error, PartialEq)]
pub enum TypeError {
    #[error("opaque value at {path} cannot be represented as JSON")]
    Unrepresentable { path: KeyPath },

    #[error("non-finite float {value} at {path} cannot be represented as JSON")]
    NonFiniteFloat { path: KeyPath, value: f64 },

    #[error("empty segment in key path {0:?}")]
    EmptySegment(String),
}

/// Result alias for type operations.
pub type TypeResult<T> = Result<T, TypeError>;
