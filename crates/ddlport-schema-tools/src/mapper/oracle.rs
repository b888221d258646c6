//! Oracle as a source engine

use ddlport_core::{DdlportError, Dialect, Row};

use super::numeric::{fits_timestamp_range, narrowest_integer};
use super::{
    MappedType, SourceMapper, TargetDialect, TypeResolution, length_or, optional_int,
    required_text, unsupported,
};
use crate::{CatalogFacts, ColumnMetadata, DdlResult};

/// Raised by Oracle when `LONG` columns appear in aggregates
const ILLEGAL_USE_OF_LONG: &str = "ORA-00997";

const LENGTH_TYPES: [&str; 9] = [
    "NUMBER",
    "CHAR",
    "NCHAR",
    "VARCHAR",
    "VARCHAR2",
    "NVARCHAR",
    "NVARCHAR2",
    "BINARY_FLOAT",
    "BINARY_DOUBLE",
];

/// Reads Oracle columns from `ALL_TAB_COLUMNS`
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleSourceMapper;

impl SourceMapper for OracleSourceMapper {
    fn source(&self) -> Dialect {
        Dialect::Oracle
    }

    fn catalog_sql(&self) -> String {
        "SELECT DATA_TYPE AS DATA_TYPE, \
                DATA_LENGTH AS DATA_LENGTH, \
                DATA_PRECISION AS DATA_PRECISION, \
                DATA_SCALE AS DATA_SCALE, \
                NULLABLE AS NULLABLE, \
                CHAR_LENGTH AS CHAR_LENGTH \
         FROM ALL_TAB_COLUMNS \
         WHERE OWNER = :1 AND TABLE_NAME = :2 AND COLUMN_NAME = :3"
            .to_string()
    }

    fn read_catalog_row(&self, row: &Row) -> DdlResult<CatalogFacts> {
        let original_type = normalize_type(&required_text(row, "DATA_TYPE")?);
        let length = if LENGTH_TYPES.contains(&original_type.as_str()) {
            length_or(row, "CHAR_LENGTH", "DATA_LENGTH")
        } else {
            0
        };

        Ok(CatalogFacts {
            original_type,
            length,
            precision: optional_int(row, "DATA_PRECISION"),
            scale: optional_int(row, "DATA_SCALE"),
            is_nullable: row.text("NULLABLE").as_deref() == Some("Y"),
        })
    }

    fn is_aggregation_rejected(&self, error: &DdlportError) -> bool {
        error
            .query_message()
            .is_some_and(|message| message.contains(ILLEGAL_USE_OF_LONG))
    }

    fn time_of_day_condition(&self, quoted_column: &str) -> String {
        format!("TO_CHAR({}, 'SSSSS') > 0", quoted_column)
    }

    fn to_mysql_type(&self, column: &ColumnMetadata) -> DdlResult<TypeResolution> {
        let mysql = match column.original_type() {
            "NUMBER" if column.scale().unwrap_or(0) == 0 => {
                return Ok(TypeResolution::Resolved(narrowest_integer(
                    column.min_value(),
                    column.max_value(),
                )));
            }
            "NUMBER" => "DECIMAL",
            "CHAR" | "NCHAR" => "CHAR",
            "VARCHAR" | "VARCHAR2" | "NVARCHAR" | "NVARCHAR2" => "VARCHAR",
            "TIMESTAMP" | "TIMESTAMP WITH TIME ZONE" | "TIMESTAMP WITH LOCAL TIME ZONE" => {
                if fits_timestamp_range(column.min_value(), column.max_value()) {
                    "TIMESTAMP"
                } else {
                    "DATETIME"
                }
            }
            "DATE" => return Ok(TypeResolution::DateOrDateTime),
            "BINARY_FLOAT" => "FLOAT",
            "BINARY_DOUBLE" => "DOUBLE",
            "BLOB" | "BFILE" | "LONG RAW" | "RAW" => "LONGBLOB",
            "LONG" | "CLOB" | "NCLOB" | "ROWID" => "LONGTEXT",
            _ => return Err(unsupported(column, TargetDialect::MySql)),
        };
        Ok(TypeResolution::named(mysql))
    }

    fn to_oracle_type(&self, column: &ColumnMetadata) -> DdlResult<TypeResolution> {
        Ok(TypeResolution::Resolved(MappedType::new(
            column.original_type(),
        )))
    }
}

/// Upper-cases a catalog type and drops inline precision, so
/// `TIMESTAMP(6) WITH TIME ZONE` reads as `TIMESTAMP WITH TIME ZONE`
fn normalize_type(data_type: &str) -> String {
    let mut normalized = String::with_capacity(data_type.len());
    let mut depth = 0usize;
    for ch in data_type.trim().chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => normalized.extend(ch.to_uppercase()),
            _ => {}
        }
    }
    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}
