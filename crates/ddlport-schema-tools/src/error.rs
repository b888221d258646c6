//! Errors raised while building metadata and rendering DDL

use ddlport_core::DdlportError;
use thiserror::Error;

use crate::{SourceMapper, TargetDialect};

/// Errors that can occur while translating a table
#[derive(Debug, Error)]
pub enum DdlError {
    /// The source type has no mapping for the requested target
    #[error("Unsupported type '{type_name}' for {target} target")]
    UnsupportedType {
        type_name: String,
        target: TargetDialect,
    },
    /// The catalog has no entry for the column reference
    #[error("Column {column} not found in catalog")]
    ColumnNotFound { column: String },
    /// A catalog row is missing a required field
    #[error("Invalid column metadata: {0}")]
    InvalidMetadata(String),
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// Failure reported by the connection, passed through unchanged
    #[error(transparent)]
    Core(#[from] DdlportError),
}

impl DdlError {
    /// Whether the source engine refused to aggregate the sampled type
    pub fn is_aggregation_rejected(&self, mapper: &dyn SourceMapper) -> bool {
        match self {
            DdlError::Core(err) => mapper.is_aggregation_rejected(err),
            _ => false,
        }
    }
}

/// Result type for metadata and DDL operations
pub type DdlResult<T> = Result<T, DdlError>;
