//! Connection trait consumed by the schema tools
//!
//! Drivers implement the three required methods; identifier quoting, value
//! escaping and catalog listing come for free from the connection's
//! [`Dialect`].

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::{Dialect, ParamKind, QueryResult, Result, StatementResult, Value, catalog};

/// A live database connection
#[async_trait]
pub trait Connection: Send + Sync {
    /// SQL dialect spoken by the engine behind this connection
    fn dialect(&self) -> Dialect;

    /// Execute a parameterized query that returns rows
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Execute a literal SQL string
    async fn execute(&self, sql: &str) -> Result<StatementResult>;

    /// Quote an identifier for embedding in SQL text
    fn quote_identifier(&self, name: &str) -> String {
        self.dialect().quote_identifier(name)
    }

    /// Escape a value for embedding in SQL text
    fn escape(&self, value: &Value, kind: ParamKind) -> Result<String> {
        self.dialect().escape(value, kind)
    }

    /// List base tables grouped by schema, all visible schemas when `schema` is `None`
    #[tracing::instrument(skip(self))]
    async fn list_tables(&self, schema: Option<&str>) -> Result<IndexMap<String, Vec<String>>> {
        let sql = catalog::tables_sql(self.dialect(), schema.is_some());
        let params: Vec<Value> = schema.map(Value::from).into_iter().collect();
        let result = self.query(&sql, &params).await?;
        let tables = catalog::group_tables(&result);
        tracing::debug!(schemas = tables.len(), "listed tables");
        Ok(tables)
    }

    /// List the column names of a table in declared order
    #[tracing::instrument(skip(self))]
    async fn list_columns(&self, schema: &str, table: &str) -> Result<Vec<String>> {
        let sql = catalog::columns_sql(self.dialect());
        let result = self
            .query(&sql, &[Value::from(schema), Value::from(table)])
            .await?;
        Ok(catalog::column_names(&result))
    }

    /// List primary key columns in key order, empty when the table has none
    #[tracing::instrument(skip(self))]
    async fn get_primary_key(&self, schema: &str, table: &str) -> Result<Vec<String>> {
        let params = [Value::from(schema), Value::from(table)];
        let sql = catalog::primary_key_sql(self.dialect());
        let mut columns = catalog::column_names(&self.query(&sql, &params).await?);

        if columns.is_empty() && self.dialect() == Dialect::MsSql {
            let fallback = self
                .query(catalog::mssql_uniqueidentifier_key_sql(), &params)
                .await?;
            columns = catalog::column_names(&fallback);
            if !columns.is_empty() {
                tracing::debug!(?columns, "using uniqueidentifier column as key");
            }
        }
        Ok(columns)
    }

    /// List secondary indexes as name to ordered columns.
    ///
    /// An index covering exactly the primary key columns is not reported.
    #[tracing::instrument(skip(self))]
    async fn get_indexes(&self, schema: &str, table: &str) -> Result<IndexMap<String, Vec<String>>> {
        let primary_key = self.get_primary_key(schema, table).await?;
        let sql = catalog::indexes_sql(self.dialect());
        let result = self
            .query(&sql, &[Value::from(schema), Value::from(table)])
            .await?;
        let indexes = catalog::group_indexes(self.dialect(), &result, &primary_key);
        tracing::debug!(count = indexes.len(), "listed secondary indexes");
        Ok(indexes)
    }
}
