//! `CREATE TABLE` assembly

use ddlport_core::Connection;
use indexmap::IndexMap;

use super::DdlConfig;
use super::column::{probe_enum_values, render_mysql_column, render_oracle_column};
use crate::{
    ColumnMetadata, DdlResult, MappedType, SourceMapper, TargetDialect, fetch_table_columns,
    source_mapper,
};

/// Builds `CREATE TABLE` statements for tables of one source connection
pub struct TableDdlBuilder<'a> {
    conn: &'a dyn Connection,
    mapper: Box<dyn SourceMapper>,
    config: DdlConfig,
}

impl<'a> TableDdlBuilder<'a> {
    /// Creates a builder with the mapper matching the connection's dialect
    pub fn new(conn: &'a dyn Connection) -> Self {
        Self {
            conn,
            mapper: source_mapper(conn.dialect()),
            config: DdlConfig::default(),
        }
    }

    /// Replaces the configuration
    pub fn with_config(mut self, config: DdlConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DdlConfig {
        &self.config
    }

    /// Metadata for every column of `table`, in declared order
    pub async fn columns(
        &self,
        database: &str,
        table: &str,
    ) -> DdlResult<IndexMap<String, ColumnMetadata>> {
        fetch_table_columns(self.conn, self.mapper.as_ref(), database, table).await
    }

    /// Renders the MySQL statement for `table`
    pub async fn mysql_table_def(&self, database: &str, table: &str) -> DdlResult<String> {
        self.build(database, table, TargetDialect::MySql).await
    }

    /// Renders the Oracle statement for `table`
    pub async fn oracle_table_def(&self, database: &str, table: &str) -> DdlResult<String> {
        self.build(database, table, TargetDialect::Oracle).await
    }

    /// Renders the statement for `table` in the `target` dialect.
    ///
    /// The first column whose type cannot be mapped aborts the render.
    #[tracing::instrument(skip(self))]
    pub async fn build(
        &self,
        database: &str,
        table: &str,
        target: TargetDialect,
    ) -> DdlResult<String> {
        let mut columns = self.columns(database, table).await?;
        if self.config.skip_unused_columns {
            columns.retain(|name, column| {
                let keep = column.distinct_value_count() > 1;
                if !keep {
                    tracing::debug!(column = %name, "skipping unused column");
                }
                keep
            });
        }

        let mut definitions = Vec::with_capacity(columns.len());
        let mut resolved_types: IndexMap<&str, MappedType> = IndexMap::new();
        for (name, column) in &columns {
            let mapped = column
                .resolve_type(self.conn, self.mapper.as_ref(), target)
                .await?;
            let definition = match target {
                TargetDialect::MySql => {
                    let values = probe_enum_values(self.conn, column, &mapped, &self.config).await?;
                    render_mysql_column(column, &mapped, &values)
                }
                TargetDialect::Oracle => render_oracle_column(column, &mapped),
            };
            definitions.push(definition);
            resolved_types.insert(name.as_str(), mapped);
        }

        let quote = |name: &str| target.quote_identifier(&name.to_lowercase());

        let mut ddl = format!("CREATE TABLE {} (\n", quote(table));
        ddl.push_str(&definitions.join(",\n"));

        let primary_key = self.conn.get_primary_key(database, table).await?;
        if self.primary_key_fits(&primary_key, &columns, target) {
            let key_columns: Vec<String> = primary_key.iter().map(|c| quote(c.as_str())).collect();
            ddl.push_str(",\n\nPRIMARY KEY (");
            ddl.push_str(&key_columns.join(", \n"));
            ddl.push(')');
        }

        let indexes = self.conn.get_indexes(database, table).await?;
        for (index_name, index_columns) in &indexes {
            if !self.index_fits(index_name, index_columns, &columns, &resolved_types, target) {
                continue;
            }
            let index_columns: Vec<String> = index_columns.iter().map(|c| quote(c.as_str())).collect();
            ddl.push_str(&format!(
                ",\nKEY {} ({})",
                quote(index_name.as_str()),
                index_columns.join(", ")
            ));
        }

        match target {
            TargetDialect::MySql => {
                ddl.push(')');
                if !self.config.mysql_table_options.is_empty() {
                    ddl.push(' ');
                    ddl.push_str(&self.config.mysql_table_options);
                }
            }
            TargetDialect::Oracle => ddl.push(')'),
        }

        tracing::debug!(columns = definitions.len(), %target, "rendered table");
        Ok(ddl)
    }

    fn primary_key_fits(
        &self,
        primary_key: &[String],
        columns: &IndexMap<String, ColumnMetadata>,
        target: TargetDialect,
    ) -> bool {
        if primary_key.is_empty() {
            return false;
        }
        if let Some(dropped) = primary_key.iter().find(|c| !columns.contains_key(c.as_str())) {
            tracing::debug!(column = %dropped, "omitting primary key over skipped column");
            return false;
        }
        if target == TargetDialect::Oracle {
            return true;
        }

        let length = key_length(primary_key, columns);
        let fits = length <= self.config.mysql_key_length_limit;
        if !fits {
            tracing::debug!(length, "omitting primary key longer than key length limit");
        }
        fits
    }

    fn index_fits(
        &self,
        index_name: &str,
        index_columns: &[String],
        columns: &IndexMap<String, ColumnMetadata>,
        resolved_types: &IndexMap<&str, MappedType>,
        target: TargetDialect,
    ) -> bool {
        if index_columns.iter().any(|c| !columns.contains_key(c.as_str())) {
            tracing::debug!(index = %index_name, "skipping index over skipped column");
            return false;
        }
        if target == TargetDialect::Oracle {
            return true;
        }

        if key_length(index_columns, columns) > self.config.mysql_key_length_limit {
            tracing::debug!(index = %index_name, "skipping index longer than key length limit");
            return false;
        }
        let has_large_object = index_columns
            .iter()
            .filter_map(|c| resolved_types.get(c.as_str()))
            .any(MappedType::is_large_object);
        if has_large_object {
            tracing::debug!(index = %index_name, "skipping index over BLOB/TEXT column");
            return false;
        }
        true
    }
}

/// Combined length of key columns; `(MAX)` lengths never fit
fn key_length(key_columns: &[String], columns: &IndexMap<String, ColumnMetadata>) -> i64 {
    key_columns
        .iter()
        .filter_map(|c| columns.get(c.as_str()))
        .map(|column| if column.length() < 0 { i64::MAX } else { column.length() })
        .fold(0i64, i64::saturating_add)
}
