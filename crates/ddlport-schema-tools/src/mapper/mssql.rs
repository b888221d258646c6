//! SQL Server as a source engine

use ddlport_core::{Dialect, Row};

use super::numeric::fits_timestamp_range;
use super::{
    MappedType, SamplingPlan, SourceMapper, TargetDialect, TypeResolution, length_or,
    optional_int, required_text, unsupported,
};
use crate::{CatalogFacts, ColumnMetadata, DdlResult};

/// Catalog length reported for `(MAX)` types
const MAX_LENGTH: i64 = -1;

/// Length of the canonical text form of a `uniqueidentifier`
const UNIQUEIDENTIFIER_LENGTH: i64 = 36;

const LENGTH_TYPES: [&str; 21] = [
    "TINYINT",
    "SMALLINT",
    "INT",
    "BIGINT",
    "DECIMAL",
    "NUMERIC",
    "MONEY",
    "SMALLMONEY",
    "BIT",
    "FLOAT",
    "REAL",
    "CHAR",
    "NCHAR",
    "VARCHAR",
    "NVARCHAR",
    "BINARY",
    "VARBINARY",
    "ROWVERSION",
    "TIMESTAMP",
    "HIERARCHYID",
    "XML",
];

/// Large object types that cannot be grouped
const UNGROUPABLE_TYPES: [&str; 3] = ["TEXT", "NTEXT", "IMAGE"];

/// Types without a usable ordering for `MIN`/`MAX`
const UNORDERED_TYPES: [&str; 5] = ["BIT", "TEXT", "NTEXT", "IMAGE", "UNIQUEIDENTIFIER"];

/// Reads SQL Server columns from `INFORMATION_SCHEMA.COLUMNS`
#[derive(Debug, Clone, Copy, Default)]
pub struct MsSqlSourceMapper;

impl SourceMapper for MsSqlSourceMapper {
    fn source(&self) -> Dialect {
        Dialect::MsSql
    }

    fn catalog_sql(&self) -> String {
        "SELECT DATA_TYPE AS DATA_TYPE, \
                CHARACTER_MAXIMUM_LENGTH AS CHARACTER_MAXIMUM_LENGTH, \
                NUMERIC_PRECISION AS NUMERIC_PRECISION, \
                COALESCE(DATETIME_PRECISION, NUMERIC_SCALE) AS SCALE, \
                IS_NULLABLE AS IS_NULLABLE \
         FROM INFORMATION_SCHEMA.COLUMNS \
         WHERE TABLE_SCHEMA = @P1 AND TABLE_NAME = @P2 AND COLUMN_NAME = @P3"
            .to_string()
    }

    fn read_catalog_row(&self, row: &Row) -> DdlResult<CatalogFacts> {
        let original_type = required_text(row, "DATA_TYPE")?.to_uppercase();
        let length = match original_type.as_str() {
            "UNIQUEIDENTIFIER" => UNIQUEIDENTIFIER_LENGTH,
            other if LENGTH_TYPES.contains(&other) => {
                length_or(row, "CHARACTER_MAXIMUM_LENGTH", "NUMERIC_PRECISION")
            }
            _ => 0,
        };

        Ok(CatalogFacts {
            original_type,
            length,
            precision: optional_int(row, "NUMERIC_PRECISION"),
            scale: optional_int(row, "SCALE"),
            is_nullable: row.text("IS_NULLABLE").as_deref() == Some("YES"),
        })
    }

    fn sampling_plan(&self, original_type: &str) -> SamplingPlan {
        SamplingPlan {
            distinct_count: !UNGROUPABLE_TYPES.contains(&original_type),
            min_max: !UNORDERED_TYPES.contains(&original_type),
        }
    }

    fn time_of_day_condition(&self, quoted_column: &str) -> String {
        format!("CONVERT(VARCHAR(8), {}, 108) != '00:00:00'", quoted_column)
    }

    fn to_mysql_type(&self, column: &ColumnMetadata) -> DdlResult<TypeResolution> {
        let is_max = column.length() == MAX_LENGTH;
        let mysql = match column.original_type() {
            "BIT" | "TINYINT" => return Ok(TypeResolution::Resolved(MappedType::unsigned("TINYINT"))),
            "SMALLINT" => "SMALLINT",
            "INT" => "INT",
            "BIGINT" => "BIGINT",
            "DECIMAL" | "NUMERIC" | "MONEY" | "SMALLMONEY" => "DECIMAL",
            "FLOAT" => "FLOAT",
            "REAL" => "DOUBLE",
            "DATE" => "DATE",
            "DATETIME" | "DATETIME2" | "SMALLDATETIME" => {
                return Ok(TypeResolution::DateOrDateTime);
            }
            "DATETIMEOFFSET" => {
                if fits_timestamp_range(column.min_value(), column.max_value()) {
                    "TIMESTAMP"
                } else {
                    "DATETIME"
                }
            }
            "TIME" => "TIME",
            "CHAR" | "NCHAR" => "CHAR",
            "VARCHAR" | "NVARCHAR" | "XML" if is_max => "LONGTEXT",
            "VARCHAR" | "NVARCHAR" => "VARCHAR",
            "TEXT" | "NTEXT" => "LONGTEXT",
            "BINARY" => "BINARY",
            "VARBINARY" if is_max => "LONGBLOB",
            "VARBINARY" => "VARBINARY",
            "IMAGE" => "LONGBLOB",
            "ROWVERSION" | "TIMESTAMP" | "HIERARCHYID" | "XML" => "VARCHAR",
            "UNIQUEIDENTIFIER" => "CHAR",
            _ => return Err(unsupported(column, TargetDialect::MySql)),
        };
        Ok(TypeResolution::named(mysql))
    }

    fn to_oracle_type(&self, column: &ColumnMetadata) -> DdlResult<TypeResolution> {
        let oracle = match column.original_type() {
            "BIT" | "TINYINT" | "SMALLINT" | "INT" | "BIGINT" | "DECIMAL" | "NUMERIC"
            | "MONEY" | "SMALLMONEY" => "NUMBER",
            "FLOAT" => "BINARY_FLOAT",
            "REAL" => "BINARY_DOUBLE",
            "DATE" => "DATE",
            "DATETIME" | "DATETIME2" | "SMALLDATETIME" | "DATETIMEOFFSET" => {
                if column.has_fractional_seconds() {
                    "TIMESTAMP"
                } else {
                    "DATE"
                }
            }
            "TIME" => "TIME",
            "CHAR" | "NCHAR" => "NCHAR",
            "VARCHAR" | "NVARCHAR" | "TEXT" | "NTEXT" => "NVARCHAR",
            "BINARY" | "VARBINARY" | "IMAGE" => "BLOB",
            // TIMESTAMP is SQL Server's rowversion, not a point in time
            "ROWVERSION" | "TIMESTAMP" | "HIERARCHYID" | "XML" => "NVARCHAR",
            "UNIQUEIDENTIFIER" => "CHAR",
            _ => return Err(unsupported(column, TargetDialect::Oracle)),
        };
        Ok(TypeResolution::named(oracle))
    }
}
