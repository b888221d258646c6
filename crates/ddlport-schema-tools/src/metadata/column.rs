//! Column metadata built from catalog declarations and sampled data

use ddlport_core::{Connection, Dialect, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::sampler::{SampledFacts, ValueSampler};
use crate::{DdlError, DdlResult, MappedType, SourceMapper, TargetDialect, TypeResolution};

/// A fully qualified column reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Database, schema or owner holding the table
    pub database: String,
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(
        database: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
            column: column.into(),
        }
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.database, self.table, self.column)
    }
}

/// Attributes declared in the source catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFacts {
    /// Upper-cased source type, MySQL unsigned types end in ` UNSIGNED`
    pub original_type: String,
    /// Already reduced by the source's length rule, 0 when not applicable
    pub length: i64,
    pub precision: Option<i64>,
    pub scale: Option<i64>,
    pub is_nullable: bool,
}

/// Everything known about one column of a source table.
///
/// Values are immutable once built. A distinct count that was never sampled
/// reads as `u64::MAX`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMetadata {
    column_ref: ColumnRef,
    source: Dialect,
    original_type: String,
    length: i64,
    precision: Option<i64>,
    scale: Option<i64>,
    is_nullable: bool,
    min_value: Option<String>,
    max_value: Option<String>,
    distinct_value_count: u64,
}

impl ColumnMetadata {
    /// Combines catalog and sampled facts for `column_ref`
    pub fn new(
        column_ref: ColumnRef,
        source: Dialect,
        catalog: CatalogFacts,
        sampled: SampledFacts,
    ) -> Self {
        Self {
            column_ref,
            source,
            original_type: catalog.original_type,
            length: catalog.length,
            precision: catalog.precision,
            scale: catalog.scale,
            is_nullable: catalog.is_nullable,
            min_value: sampled.min_value,
            max_value: sampled.max_value,
            distinct_value_count: sampled.distinct_value_count.unwrap_or(u64::MAX),
        }
    }

    /// Reads the catalog entry for `column_ref` and samples its data
    #[tracing::instrument(skip(conn, mapper), fields(source = %mapper.source()))]
    pub async fn fetch(
        conn: &dyn Connection,
        mapper: &dyn SourceMapper,
        column_ref: ColumnRef,
    ) -> DdlResult<Self> {
        let params = [
            Value::from(column_ref.database.as_str()),
            Value::from(column_ref.table.as_str()),
            Value::from(column_ref.column.as_str()),
        ];
        let result = conn.query(&mapper.catalog_sql(), &params).await?;
        let row = result.first().ok_or_else(|| DdlError::ColumnNotFound {
            column: column_ref.to_string(),
        })?;
        let catalog = mapper.read_catalog_row(row)?;

        let plan = mapper.sampling_plan(&catalog.original_type);
        let sampled = ValueSampler::new(conn, &column_ref)
            .sample(mapper, plan)
            .await?;

        Ok(Self::new(column_ref, mapper.source(), catalog, sampled))
    }

    pub fn column_ref(&self) -> &ColumnRef {
        &self.column_ref
    }

    /// Engine the column was read from
    pub fn source(&self) -> Dialect {
        self.source
    }

    pub fn name(&self) -> &str {
        &self.column_ref.column
    }

    pub fn original_type(&self) -> &str {
        &self.original_type
    }

    pub fn length(&self) -> i64 {
        self.length
    }

    pub fn precision(&self) -> Option<i64> {
        self.precision
    }

    pub fn scale(&self) -> Option<i64> {
        self.scale
    }

    pub fn is_nullable(&self) -> bool {
        self.is_nullable
    }

    pub fn min_value(&self) -> Option<&str> {
        self.min_value.as_deref()
    }

    pub fn max_value(&self) -> Option<&str> {
        self.max_value.as_deref()
    }

    pub fn distinct_value_count(&self) -> u64 {
        self.distinct_value_count
    }

    /// Whether a fractional-seconds precision is declared
    pub fn has_fractional_seconds(&self) -> bool {
        self.precision.unwrap_or(0) != 0 || self.scale.unwrap_or(0) != 0
    }

    /// Maps the type for `target`, running the time-of-day probe when the
    /// mapping depends on it
    pub async fn resolve_type(
        &self,
        conn: &dyn Connection,
        mapper: &dyn SourceMapper,
        target: TargetDialect,
    ) -> DdlResult<MappedType> {
        let resolution = mapper.to_target_type(self, target)?;
        let probe = match resolution {
            TypeResolution::Resolved(_) => 0,
            TypeResolution::DateOrDateTime => {
                ValueSampler::new(conn, &self.column_ref)
                    .time_of_day_count(mapper)
                    .await?
            }
        };
        Ok(resolution.settle(probe))
    }
}

/// Builds metadata for every column of a table in declared order
#[tracing::instrument(skip(conn, mapper))]
pub async fn fetch_table_columns(
    conn: &dyn Connection,
    mapper: &dyn SourceMapper,
    database: &str,
    table: &str,
) -> DdlResult<IndexMap<String, ColumnMetadata>> {
    let names = conn.list_columns(database, table).await?;
    let mut columns = IndexMap::with_capacity(names.len());
    for name in names {
        let column_ref = ColumnRef::new(database, table, name.as_str());
        let metadata = ColumnMetadata::fetch(conn, mapper, column_ref).await?;
        columns.insert(name, metadata);
    }
    tracing::debug!(count = columns.len(), "fetched column metadata");
    Ok(columns)
}
