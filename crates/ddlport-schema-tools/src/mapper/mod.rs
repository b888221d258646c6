//! Per-source-dialect type mapping
//!
//! A [`SourceMapper`] is chosen once per table from the source engine. It
//! knows how that engine describes a column in its catalog, which sampling
//! queries the engine can answer, and how each of its types translates to
//! every supported target dialect.

mod mssql;
mod mysql;
pub mod numeric;
mod oracle;


use ddlport_core::{DdlportError, Dialect, Row};
use serde::{Deserialize, Serialize};

use crate::{CatalogFacts, ColumnMetadata, DdlError, DdlResult};

pub use mssql::MsSqlSourceMapper;
pub use mysql::MySqlSourceMapper;
pub use oracle::OracleSourceMapper;

/// Dialects DDL can be rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetDialect {
    MySql,
    Oracle,
}

impl TargetDialect {
    /// Returns the dialect name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetDialect::MySql => "mysql",
            TargetDialect::Oracle => "oracle",
        }
    }

    /// The engine dialect this target renders for
    pub fn dialect(&self) -> Dialect {
        match self {
            TargetDialect::MySql => Dialect::MySql,
            TargetDialect::Oracle => Dialect::Oracle,
        }
    }

    /// Quotes an identifier with the target's quote character
    pub fn quote_identifier(&self, name: &str) -> String {
        self.dialect().quote_identifier(name)
    }
}

impl std::fmt::Display for TargetDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integer types that never render a display width
const INTEGER_FAMILY: [&str; 6] = ["TINYINT", "SMALLINT", "MEDIUMINT", "INT", "INTEGER", "BIGINT"];

/// A target type name with its signedness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedType {
    name: String,
    unsigned: bool,
}

impl MappedType {
    /// A signed (or signless) type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unsigned: false,
        }
    }

    /// An unsigned integer or decimal type
    pub fn unsigned(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unsigned: true,
        }
    }

    /// Splits a MySQL type string such as `INT UNSIGNED`
    pub fn parse(type_name: &str) -> Self {
        match type_name.strip_suffix(" UNSIGNED") {
            Some(base) => Self::unsigned(base),
            None => Self::new(type_name),
        }
    }

    /// Type name without the signedness suffix
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_unsigned(&self) -> bool {
        self.unsigned
    }

    /// Whether the type belongs to the integer family
    pub fn is_integer(&self) -> bool {
        INTEGER_FAMILY.contains(&self.name.as_str())
    }

    /// Large object types MySQL cannot index without a prefix length
    pub fn is_large_object(&self) -> bool {
        self.name.ends_with("BLOB") || self.name.ends_with("TEXT")
    }
}

impl std::fmt::Display for MappedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.unsigned {
            write!(f, "{} UNSIGNED", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Outcome of mapping a column's type to a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeResolution {
    /// The mapping is decided by metadata alone
    Resolved(MappedType),
    /// `DATETIME` if any stored value carries a time of day, `DATE` otherwise
    DateOrDateTime,
}

impl TypeResolution {
    /// Resolution to a signless type name
    pub fn named(name: &str) -> Self {
        TypeResolution::Resolved(MappedType::new(name))
    }

    /// Settles the resolution with the result of the time-of-day probe
    pub fn settle(self, rows_with_time_of_day: u64) -> MappedType {
        match self {
            TypeResolution::Resolved(mapped) => mapped,
            TypeResolution::DateOrDateTime if rows_with_time_of_day > 0 => {
                MappedType::new("DATETIME")
            }
            TypeResolution::DateOrDateTime => MappedType::new("DATE"),
        }
    }
}

/// Which sampling queries a source engine can answer for a type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingPlan {
    pub distinct_count: bool,
    pub min_max: bool,
}

impl SamplingPlan {
    pub const FULL: SamplingPlan = SamplingPlan {
        distinct_count: true,
        min_max: true,
    };
}

/// Source-dialect behaviour for building and translating column metadata
pub trait SourceMapper: Send + Sync {
    /// The engine this mapper reads from
    fn source(&self) -> Dialect;

    /// Catalog query for one column, bound to (database, table, column)
    fn catalog_sql(&self) -> String;

    /// Reads the declared attributes from a catalog row
    fn read_catalog_row(&self, row: &Row) -> DdlResult<CatalogFacts>;

    /// Sampling queries to run for the given original type
    fn sampling_plan(&self, _original_type: &str) -> SamplingPlan {
        SamplingPlan::FULL
    }

    /// Whether a sampling failure means the engine cannot aggregate the type
    fn is_aggregation_rejected(&self, _error: &DdlportError) -> bool {
        false
    }

    /// Predicate selecting rows whose value has a non-zero time of day
    fn time_of_day_condition(&self, quoted_column: &str) -> String;

    /// Maps the column's type for a MySQL target
    fn to_mysql_type(&self, column: &ColumnMetadata) -> DdlResult<TypeResolution>;

    /// Maps the column's type for an Oracle target
    fn to_oracle_type(&self, column: &ColumnMetadata) -> DdlResult<TypeResolution>;

    /// Maps the column's type for `target`
    fn to_target_type(
        &self,
        column: &ColumnMetadata,
        target: TargetDialect,
    ) -> DdlResult<TypeResolution> {
        match target {
            TargetDialect::MySql => self.to_mysql_type(column),
            TargetDialect::Oracle => self.to_oracle_type(column),
        }
    }
}

/// Get the source mapper for a given source dialect
pub fn source_mapper(source: Dialect) -> Box<dyn SourceMapper> {
    match source {
        Dialect::MySql => Box::new(MySqlSourceMapper),
        Dialect::Oracle => Box::new(OracleSourceMapper),
        Dialect::MsSql => Box::new(MsSqlSourceMapper),
    }
}

pub(crate) fn unsupported(column: &ColumnMetadata, target: TargetDialect) -> DdlError {
    DdlError::UnsupportedType {
        type_name: column.original_type().to_string(),
        target,
    }
}

/// Reads a required text field of a catalog row
pub(crate) fn required_text(row: &Row, field: &str) -> DdlResult<String> {
    row.text(field)
        .ok_or_else(|| DdlError::InvalidMetadata(format!("catalog row has no {}", field)))
}

/// Reads an optional integer field, treating non-numeric text as absent
pub(crate) fn optional_int(row: &Row, field: &str) -> Option<i64> {
    row.int(field)
}

/// Catalog length with `fallback` used when the primary field is absent or zero
pub(crate) fn length_or(row: &Row, primary: &str, fallback: &str) -> i64 {
    match optional_int(row, primary) {
        Some(length) if length != 0 => length,
        _ => optional_int(row, fallback).unwrap_or(0),
    }
}
