//! Catalog queries behind the provided [`crate::Connection`] listing methods
//!
//! Every statement selects upper-case aliases so rows can be read the same
//! way regardless of engine.

use indexmap::IndexMap;

use crate::{Dialect, QueryResult};

const MYSQL_SYSTEM_SCHEMAS: &str = "'information_schema', 'mysql', 'performance_schema', 'sys'";

/// Longest index name SQL Server catalogs are reported with
pub const MSSQL_INDEX_NAME_LIMIT: usize = 64;

/// Lists base tables, filtered to one schema when `with_schema` is set
pub fn tables_sql(dialect: Dialect, with_schema: bool) -> String {
    match dialect {
        Dialect::MySql => {
            let filter = if with_schema {
                "TABLE_SCHEMA = ?".to_string()
            } else {
                format!("TABLE_SCHEMA NOT IN ({})", MYSQL_SYSTEM_SCHEMAS)
            };
            format!(
                "SELECT TABLE_SCHEMA AS TABLE_SCHEMA, TABLE_NAME AS TABLE_NAME \
                 FROM INFORMATION_SCHEMA.TABLES \
                 WHERE TABLE_TYPE = 'BASE TABLE' AND {} \
                 ORDER BY TABLE_SCHEMA, TABLE_NAME",
                filter
            )
        }
        Dialect::Oracle => {
            let filter = if with_schema { " WHERE OWNER = :1" } else { "" };
            format!(
                "SELECT OWNER AS TABLE_SCHEMA, TABLE_NAME AS TABLE_NAME \
                 FROM ALL_TABLES{} \
                 ORDER BY OWNER, TABLE_NAME",
                filter
            )
        }
        Dialect::MsSql => {
            let filter = if with_schema {
                " AND TABLE_SCHEMA = @P1"
            } else {
                ""
            };
            format!(
                "SELECT TABLE_SCHEMA AS TABLE_SCHEMA, TABLE_NAME AS TABLE_NAME \
                 FROM INFORMATION_SCHEMA.TABLES \
                 WHERE TABLE_TYPE = 'BASE TABLE'{} \
                 ORDER BY TABLE_SCHEMA, TABLE_NAME",
                filter
            )
        }
    }
}

/// Column names of one table in declared ordinal order
pub fn columns_sql(dialect: Dialect) -> String {
    let (p1, p2) = (dialect.placeholder(1), dialect.placeholder(2));
    match dialect {
        Dialect::MySql | Dialect::MsSql => format!(
            "SELECT COLUMN_NAME AS COLUMN_NAME \
             FROM INFORMATION_SCHEMA.COLUMNS \
             WHERE TABLE_SCHEMA = {} AND TABLE_NAME = {} \
             ORDER BY ORDINAL_POSITION",
            p1, p2
        ),
        Dialect::Oracle => format!(
            "SELECT COLUMN_NAME AS COLUMN_NAME \
             FROM ALL_TAB_COLUMNS \
             WHERE OWNER = {} AND TABLE_NAME = {} \
             ORDER BY COLUMN_ID",
            p1, p2
        ),
    }
}

/// Primary key columns of one table in key order
pub fn primary_key_sql(dialect: Dialect) -> String {
    let (p1, p2) = (dialect.placeholder(1), dialect.placeholder(2));
    match dialect {
        Dialect::MySql => format!(
            "SELECT COLUMN_NAME AS COLUMN_NAME \
             FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE \
             WHERE TABLE_SCHEMA = {} AND TABLE_NAME = {} AND CONSTRAINT_NAME = 'PRIMARY' \
             ORDER BY ORDINAL_POSITION",
            p1, p2
        ),
        Dialect::Oracle => format!(
            "SELECT cols.COLUMN_NAME AS COLUMN_NAME \
             FROM ALL_CONSTRAINTS cons \
             JOIN ALL_CONS_COLUMNS cols \
               ON cons.OWNER = cols.OWNER AND cons.CONSTRAINT_NAME = cols.CONSTRAINT_NAME \
             WHERE cons.CONSTRAINT_TYPE = 'P' AND cons.OWNER = {} AND cons.TABLE_NAME = {} \
             ORDER BY cols.POSITION",
            p1, p2
        ),
        Dialect::MsSql => format!(
            "SELECT col.name AS COLUMN_NAME \
             FROM sys.indexes ind \
             INNER JOIN sys.index_columns ic \
               ON ind.object_id = ic.object_id AND ind.index_id = ic.index_id \
             INNER JOIN sys.columns col \
               ON ic.object_id = col.object_id AND ic.column_id = col.column_id \
             INNER JOIN sys.tables t ON ind.object_id = t.object_id \
             INNER JOIN sys.schemas s ON t.schema_id = s.schema_id \
             WHERE ind.is_primary_key = 1 AND col.is_nullable = 0 \
               AND s.name = {} AND t.name = {} \
             ORDER BY ic.key_ordinal",
            p1, p2
        ),
    }
}

/// SQL Server tables without a declared key fall back to their first
/// `uniqueidentifier` column
pub fn mssql_uniqueidentifier_key_sql() -> &'static str {
    "SELECT TOP 1 COLUMN_NAME AS COLUMN_NAME \
     FROM INFORMATION_SCHEMA.COLUMNS \
     WHERE TABLE_SCHEMA = @P1 AND TABLE_NAME = @P2 AND DATA_TYPE = 'uniqueidentifier' \
     ORDER BY ORDINAL_POSITION"
}

/// Secondary index members, one row per (index, column)
pub fn indexes_sql(dialect: Dialect) -> String {
    let (p1, p2) = (dialect.placeholder(1), dialect.placeholder(2));
    match dialect {
        Dialect::MySql => format!(
            "SELECT INDEX_NAME AS INDEX_NAME, COLUMN_NAME AS COLUMN_NAME \
             FROM INFORMATION_SCHEMA.STATISTICS \
             WHERE TABLE_SCHEMA = {} AND TABLE_NAME = {} AND INDEX_NAME != 'PRIMARY' \
             ORDER BY INDEX_NAME, SEQ_IN_INDEX",
            p1, p2
        ),
        Dialect::Oracle => format!(
            "SELECT INDEX_NAME AS INDEX_NAME, COLUMN_NAME AS COLUMN_NAME \
             FROM ALL_IND_COLUMNS \
             WHERE TABLE_OWNER = {} AND TABLE_NAME = {} \
             ORDER BY INDEX_NAME, COLUMN_POSITION",
            p1, p2
        ),
        Dialect::MsSql => format!(
            "SELECT ind.name AS INDEX_NAME, col.name AS COLUMN_NAME \
             FROM sys.indexes ind \
             INNER JOIN sys.index_columns ic \
               ON ind.object_id = ic.object_id AND ind.index_id = ic.index_id \
             INNER JOIN sys.columns col \
               ON ic.object_id = col.object_id AND ic.column_id = col.column_id \
             INNER JOIN sys.tables t ON ind.object_id = t.object_id \
             INNER JOIN sys.schemas s ON t.schema_id = s.schema_id \
             WHERE ind.is_primary_key = 0 AND ind.type > 0 \
               AND s.name = {} AND t.name = {} \
             ORDER BY ind.name, ic.key_ordinal",
            p1, p2
        ),
    }
}

/// Reads the `COLUMN_NAME` field of every row
pub fn column_names(result: &QueryResult) -> Vec<String> {
    result
        .rows
        .iter()
        .filter_map(|row| row.text("COLUMN_NAME"))
        .collect()
}

/// Groups `(TABLE_SCHEMA, TABLE_NAME)` rows by schema
pub fn group_tables(result: &QueryResult) -> IndexMap<String, Vec<String>> {
    let mut tables: IndexMap<String, Vec<String>> = IndexMap::new();
    for row in &result.rows {
        if let (Some(schema), Some(table)) = (row.text("TABLE_SCHEMA"), row.text("TABLE_NAME")) {
            tables.entry(schema).or_default().push(table);
        }
    }
    tables
}

/// Groups `(INDEX_NAME, COLUMN_NAME)` rows into an index map and removes the
/// index that duplicates the primary key
pub fn group_indexes(
    dialect: Dialect,
    result: &QueryResult,
    primary_key: &[String],
) -> IndexMap<String, Vec<String>> {
    let mut indexes: IndexMap<String, Vec<String>> = IndexMap::new();
    for row in &result.rows {
        let (Some(mut name), Some(column)) = (row.text("INDEX_NAME"), row.text("COLUMN_NAME"))
        else {
            continue;
        };
        if dialect == Dialect::MsSql && name.chars().count() > MSSQL_INDEX_NAME_LIMIT {
            name = name.chars().take(MSSQL_INDEX_NAME_LIMIT).collect();
        }
        indexes.entry(name).or_default().push(column);
    }

    if !primary_key.is_empty() {
        indexes.retain(|_, columns| columns.as_slice() != primary_key);
    }
    indexes
}
