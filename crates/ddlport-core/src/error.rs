//! Error types for ddlport

use thiserror::Error;

/// Core error type for connection and catalog operations
#[derive(Error, Debug)]
pub enum DdlportError {
    #[error("Query error: {0}")]
    Query(String),

    /// A value handed to [`crate::Dialect::escape`] does not match the requested kind
    #[error("Parameter {value} is not {expected}")]
    ParameterType { value: String, expected: String },
}

impl DdlportError {
    /// Message text for errors reported by the database engine
    pub fn query_message(&self) -> Option<&str> {
        match self {
            DdlportError::Query(message) => Some(message),
            _ => None,
        }
    }
}

/// Result type alias for ddlport core operations
pub type Result<T> = std::result::Result<T, DdlportError>;
