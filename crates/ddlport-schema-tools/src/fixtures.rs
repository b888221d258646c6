//! Scripted source tables for tests

use ddlport_core::{Dialect, MockConnection, QueryResult, Value, catalog};

use crate::source_mapper;

pub const DATABASE: &str = "shop";
pub const TABLE: &str = "items";

/// Initialize logging for tests if not already initialized
pub fn initialize_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("ddlport_schema_tools=debug".parse().unwrap()),
            )
            .with_test_writer()
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// One column of a scripted table: its catalog row and sampled data
#[derive(Debug, Clone)]
pub struct ScriptedColumn {
    pub name: &'static str,
    dialect: Dialect,
    catalog: Vec<(&'static str, Value)>,
    distinct: Option<u64>,
    bounds: Option<(Value, Value)>,
    distinct_values: Option<Vec<&'static str>>,
    declared_type: Option<&'static str>,
    time_of_day: Option<u64>,
    rejected: Option<(&'static str, u64)>,
}

impl ScriptedColumn {
    fn new(name: &'static str, dialect: Dialect, catalog: Vec<(&'static str, Value)>) -> Self {
        Self {
            name,
            dialect,
            catalog,
            distinct: None,
            bounds: None,
            distinct_values: None,
            declared_type: None,
            time_of_day: None,
            rejected: None,
        }
    }

    /// A MySQL column; `column_type` is the full declaration such as `int(10) unsigned`
    pub fn mysql(name: &'static str, data_type: &str, column_type: &str) -> Self {
        Self::new(
            name,
            Dialect::MySql,
            vec![
                ("DATA_TYPE", Value::from(data_type)),
                ("CHARACTER_MAXIMUM_LENGTH", Value::Null),
                ("NUMERIC_PRECISION", Value::Null),
                ("SCALE", Value::Null),
                ("IS_NULLABLE", Value::from("NO")),
                ("COLUMN_TYPE", Value::from(column_type)),
            ],
        )
    }

    pub fn oracle(name: &'static str, data_type: &str) -> Self {
        Self::new(
            name,
            Dialect::Oracle,
            vec![
                ("DATA_TYPE", Value::from(data_type)),
                ("DATA_LENGTH", Value::Null),
                ("DATA_PRECISION", Value::Null),
                ("DATA_SCALE", Value::Null),
                ("NULLABLE", Value::from("N")),
                ("CHAR_LENGTH", Value::Int64(0)),
            ],
        )
    }

    pub fn mssql(name: &'static str, data_type: &str) -> Self {
        Self::new(
            name,
            Dialect::MsSql,
            vec![
                ("DATA_TYPE", Value::from(data_type)),
                ("CHARACTER_MAXIMUM_LENGTH", Value::Null),
                ("NUMERIC_PRECISION", Value::Null),
                ("SCALE", Value::Null),
                ("IS_NULLABLE", Value::from("NO")),
            ],
        )
    }

    /// Sets a catalog field
    pub fn field(mut self, field: &'static str, value: Value) -> Self {
        match self.catalog.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = value,
            None => self.catalog.push((field, value)),
        }
        self
    }

    pub fn nullable(self) -> Self {
        match self.dialect {
            Dialect::Oracle => self.field("NULLABLE", Value::from("Y")),
            Dialect::MySql | Dialect::MsSql => self.field("IS_NULLABLE", Value::from("YES")),
        }
    }

    pub fn distinct(mut self, count: u64) -> Self {
        self.distinct = Some(count);
        self
    }

    pub fn bounds(mut self, min: impl Into<Value>, max: impl Into<Value>) -> Self {
        self.bounds = Some((min.into(), max.into()));
        self
    }

    /// Values returned by the distinct-value listing
    pub fn values(mut self, values: &[&'static str]) -> Self {
        self.distinct_values = Some(values.to_vec());
        self
    }

    /// Type reported by `SHOW COLUMNS`
    pub fn declared(mut self, declared_type: &'static str) -> Self {
        self.declared_type = Some(declared_type);
        self
    }

    /// Rows reported with a non-zero time of day
    pub fn time_of_day(mut self, rows: u64) -> Self {
        self.time_of_day = Some(rows);
        self
    }

    /// Fails the distinct count with `message` and reports `non_null` rows
    /// to the fallback count
    pub fn rejected(mut self, message: &'static str, non_null: u64) -> Self {
        self.rejected = Some((message, non_null));
        self
    }

    fn quoted(&self) -> String {
        self.dialect.quote_identifier(self.name)
    }

    /// Full text of the non-NULL count statement
    pub fn non_null_sql(&self) -> String {
        format!(
            "SELECT COUNT(*) AS COUNT FROM {} WHERE {} IS NOT NULL",
            self.dialect.qualified_name(DATABASE, TABLE),
            self.quoted()
        )
    }

    /// Full text of the time-of-day probe
    pub fn time_of_day_sql(&self) -> String {
        let condition = source_mapper(self.dialect).time_of_day_condition(&self.quoted());
        format!("{} AND {}", self.non_null_sql(), condition)
    }

    /// Registers this column's catalog row and sampling answers
    pub fn script(&self, conn: MockConnection) -> MockConnection {
        let (fields, values): (Vec<&str>, Vec<Value>) = self.catalog.iter().cloned().unzip();
        let params = vec![
            Value::from(DATABASE),
            Value::from(TABLE),
            Value::from(self.name),
        ];
        let catalog_sql = source_mapper(self.dialect).catalog_sql();
        let quoted = self.quoted();

        let mut conn = conn.on_params(
            catalog_sql,
            params,
            QueryResult::from_rows(fields, vec![values]),
        );

        let count = self.distinct.unwrap_or(2);
        conn = match self.rejected {
            Some((message, non_null)) => conn
                .on_error(format!("(SELECT {} FROM", quoted), message)
                .on_row(self.non_null_sql(), ["COUNT"], vec![Value::UInt64(non_null)]),
            None => conn.on_row(
                format!("(SELECT {} FROM", quoted),
                ["COUNT"],
                vec![Value::UInt64(count)],
            ),
        };

        let (min, max) = self.bounds.clone().unwrap_or((Value::Null, Value::Null));
        conn = conn.on_row(format!("MIN({})", quoted), ["ROWMIN", "ROWMAX"], vec![min, max]);

        if let Some(values) = &self.distinct_values {
            conn = conn.on(
                format!("SELECT DISTINCT {}", quoted),
                QueryResult::from_rows(
                    [self.name],
                    values.iter().map(|v| vec![Value::from(*v)]).collect(),
                ),
            );
        }

        if let Some(rows) = self.time_of_day {
            conn = conn.on_row(self.time_of_day_sql(), ["COUNT"], vec![Value::UInt64(rows)]);
        }

        if let Some(declared) = self.declared_type {
            conn = conn.on(
                format!("LIKE '{}'", self.name),
                QueryResult::from_rows(
                    ["Field", "Type"],
                    vec![vec![Value::from(self.name), Value::from(declared)]],
                ),
            );
        }
        conn
    }
}

/// Scripts a whole table: column listing, per-column facts, key and indexes
pub fn scripted_table(
    dialect: Dialect,
    columns: &[ScriptedColumn],
    primary_key: &[&str],
    indexes: &[(&str, &str)],
) -> MockConnection {
    let table_params = vec![Value::from(DATABASE), Value::from(TABLE)];
    let names = columns
        .iter()
        .map(|c| vec![Value::from(c.name)])
        .collect();
    let key = primary_key.iter().map(|c| vec![Value::from(*c)]).collect();
    let index_rows = indexes
        .iter()
        .map(|(index, column)| vec![Value::from(*index), Value::from(*column)])
        .collect();

    let mut conn = MockConnection::new(dialect)
        .on_params(
            catalog::columns_sql(dialect),
            table_params.clone(),
            QueryResult::from_rows(["COLUMN_NAME"], names),
        )
        .on_params(
            catalog::primary_key_sql(dialect),
            table_params.clone(),
            QueryResult::from_rows(["COLUMN_NAME"], key),
        )
        .on_params(
            catalog::indexes_sql(dialect),
            table_params.clone(),
            QueryResult::from_rows(["INDEX_NAME", "COLUMN_NAME"], index_rows),
        )
        .on_params(
            catalog::mssql_uniqueidentifier_key_sql(),
            table_params,
            QueryResult::from_rows(["COLUMN_NAME"], Vec::new()),
        );

    for column in columns {
        conn = column.script(conn);
    }
    conn
}
