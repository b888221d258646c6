//! MySQL as a source engine

use ddlport_core::{Dialect, Row};

use super::{
    MappedType, SourceMapper, TargetDialect, TypeResolution, length_or, optional_int,
    required_text, unsupported,
};
use crate::{CatalogFacts, ColumnMetadata, DdlResult};

/// Types whose catalog length is meaningful, compared without ` UNSIGNED`
const LENGTH_TYPES: [&str; 13] = [
    "BIT",
    "TINYINT",
    "SMALLINT",
    "MEDIUMINT",
    "INT",
    "BIGINT",
    "DECIMAL",
    "FLOAT",
    "DOUBLE",
    "CHAR",
    "TIME",
    "YEAR",
    "VARCHAR",
];

/// Reads MySQL columns from `INFORMATION_SCHEMA.COLUMNS`
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlSourceMapper;

impl SourceMapper for MySqlSourceMapper {
    fn source(&self) -> Dialect {
        Dialect::MySql
    }

    fn catalog_sql(&self) -> String {
        "SELECT DATA_TYPE AS DATA_TYPE, \
                CHARACTER_MAXIMUM_LENGTH AS CHARACTER_MAXIMUM_LENGTH, \
                NUMERIC_PRECISION AS NUMERIC_PRECISION, \
                COALESCE(DATETIME_PRECISION, NUMERIC_SCALE) AS SCALE, \
                IS_NULLABLE AS IS_NULLABLE, \
                COLUMN_TYPE AS COLUMN_TYPE \
         FROM INFORMATION_SCHEMA.COLUMNS \
         WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND COLUMN_NAME = ?"
            .to_string()
    }

    fn read_catalog_row(&self, row: &Row) -> DdlResult<CatalogFacts> {
        let base = required_text(row, "DATA_TYPE")?.to_uppercase();
        let unsigned = row
            .text("COLUMN_TYPE")
            .is_some_and(|column_type| column_type.to_lowercase().contains("unsigned"));
        let original_type = if unsigned {
            format!("{} UNSIGNED", base)
        } else {
            base.clone()
        };

        let length = if LENGTH_TYPES.contains(&base.as_str()) {
            length_or(row, "CHARACTER_MAXIMUM_LENGTH", "NUMERIC_PRECISION")
        } else {
            0
        };

        Ok(CatalogFacts {
            original_type,
            length,
            precision: optional_int(row, "NUMERIC_PRECISION"),
            scale: optional_int(row, "SCALE"),
            is_nullable: row.text("IS_NULLABLE").as_deref() == Some("YES"),
        })
    }

    fn time_of_day_condition(&self, quoted_column: &str) -> String {
        format!("TIME({}) != '00:00:00'", quoted_column)
    }

    fn to_mysql_type(&self, column: &ColumnMetadata) -> DdlResult<TypeResolution> {
        Ok(TypeResolution::Resolved(MappedType::parse(
            column.original_type(),
        )))
    }

    fn to_oracle_type(&self, column: &ColumnMetadata) -> DdlResult<TypeResolution> {
        let base = MappedType::parse(column.original_type());
        let oracle = match base.name() {
            "BIT" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "DECIMAL" => {
                "NUMBER"
            }
            "FLOAT" => "BINARY_FLOAT",
            "DOUBLE" => "BINARY_DOUBLE",
            "DATE" | "DATETIME" if column.has_fractional_seconds() => "TIMESTAMP",
            "DATE" | "DATETIME" => "DATE",
            "TIMESTAMP" => "TIMESTAMP",
            "CHAR" | "TIME" | "YEAR" => "CHAR",
            "ENUM" | "SET" | "VARCHAR" => "NVARCHAR",
            "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" => "BLOB",
            "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" => "NCLOB",
            _ => return Err(unsupported(column, TargetDialect::Oracle)),
        };
        Ok(TypeResolution::named(oracle))
    }
}
