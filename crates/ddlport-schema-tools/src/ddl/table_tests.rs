use ddlport_core::{Dialect, MockConnection, Value, catalog};
use indoc::indoc;
use pretty_assertions::assert_eq;

use super::*;
use crate::fixtures::{DATABASE, ScriptedColumn, TABLE, initialize_logging, scripted_table};
use crate::{DdlError, TargetDialect};

fn orders_table() -> MockConnection {
    scripted_table(
        Dialect::MySql,
        &[
            ScriptedColumn::mysql("id", "int", "int(10) unsigned")
                .field("NUMERIC_PRECISION", Value::Int64(10))
                .field("SCALE", Value::Int64(0))
                .distinct(100)
                .bounds(Value::Int64(1), Value::Int64(100)),
            ScriptedColumn::mysql("status", "varchar", "varchar(12)")
                .field("CHARACTER_MAXIMUM_LENGTH", Value::Int64(12))
                .distinct(3)
                .values(&["paid", "new", "shipped"]),
            ScriptedColumn::mysql("price", "decimal", "decimal(10,2)")
                .field("NUMERIC_PRECISION", Value::Int64(10))
                .field("SCALE", Value::Int64(2))
                .distinct(50),
            ScriptedColumn::mysql("created_at", "datetime", "datetime")
                .field("SCALE", Value::Int64(0))
                .distinct(100),
            ScriptedColumn::mysql("notes", "text", "text")
                .nullable()
                .distinct(20),
            ScriptedColumn::mysql("legacy", "varchar", "varchar(20)")
                .field("CHARACTER_MAXIMUM_LENGTH", Value::Int64(20))
                .distinct(1)
                .values(&[]),
        ],
        &["id"],
        &[
            ("idx_legacy", "legacy"),
            ("idx_notes", "notes"),
            ("idx_status", "status"),
        ],
    )
}

fn composite_key_table() -> MockConnection {
    scripted_table(
        Dialect::MySql,
        &[
            ScriptedColumn::mysql("code", "char", "char(200)")
                .field("CHARACTER_MAXIMUM_LENGTH", Value::Int64(200))
                .distinct(40),
            ScriptedColumn::mysql("region", "char", "char(50)")
                .field("CHARACTER_MAXIMUM_LENGTH", Value::Int64(50))
                .distinct(30),
        ],
        &["code", "region"],
        &[],
    )
}

#[tokio::test]
async fn test_mysql_table_def() {
    initialize_logging();
    let conn = orders_table();

    let ddl = TableDdlBuilder::new(&conn)
        .mysql_table_def(DATABASE, TABLE)
        .await
        .unwrap();

    assert_eq!(
        ddl,
        indoc! {"
            CREATE TABLE `items` (
            `id` INT UNSIGNED NOT NULL,
            `status` ENUM('new', 'paid', 'shipped') NOT NULL,
            `price` DECIMAL(10,2) NOT NULL,
            `created_at` DATETIME(0) NOT NULL,
            `notes` TEXT NULL,

            PRIMARY KEY (`id`),
            KEY `idx_status` (`status`)) ENGINE=InnoDB ROW_FORMAT=COMPRESSED"}
    );
}

#[tokio::test]
async fn test_oracle_table_def() {
    let conn = orders_table();

    let ddl = TableDdlBuilder::new(&conn)
        .oracle_table_def(DATABASE, TABLE)
        .await
        .unwrap();

    assert_eq!(
        ddl,
        indoc! {r#"
            CREATE TABLE "items" (
            "id" NUMBER(10) NOT NULL,
            "status" NVARCHAR(12) NOT NULL,
            "price" NUMBER(10,2) NOT NULL,
            "created_at" DATE NOT NULL,
            "notes" NCLOB NULL,

            PRIMARY KEY ("id"),
            KEY "idx_notes" ("notes"),
            KEY "idx_status" ("status"))"#}
    );
}

#[tokio::test]
async fn test_keeping_unused_columns_keeps_their_indexes() {
    let conn = orders_table();
    let config = DdlConfig::default().with_skip_unused_columns(false);

    let ddl = TableDdlBuilder::new(&conn)
        .with_config(config)
        .mysql_table_def(DATABASE, TABLE)
        .await
        .unwrap();

    assert!(ddl.contains("`legacy` VARCHAR(20) NOT NULL"));
    assert!(ddl.contains("KEY `idx_legacy` (`legacy`)"));
    assert!(!ddl.contains("idx_notes"));
}

#[tokio::test]
async fn test_long_mysql_primary_key_is_omitted() {
    let conn = composite_key_table();

    let ddl = TableDdlBuilder::new(&conn)
        .mysql_table_def(DATABASE, TABLE)
        .await
        .unwrap();

    assert_eq!(
        ddl,
        "CREATE TABLE `items` (\n\
         `code` CHAR(200) NOT NULL,\n\
         `region` CHAR(50) NOT NULL) ENGINE=InnoDB ROW_FORMAT=COMPRESSED"
    );
}

#[tokio::test]
async fn test_oracle_primary_key_has_no_length_limit() {
    let conn = composite_key_table();

    let ddl = TableDdlBuilder::new(&conn)
        .oracle_table_def(DATABASE, TABLE)
        .await
        .unwrap();

    assert_eq!(
        ddl,
        "CREATE TABLE \"items\" (\n\
         \"code\" CHAR(200) NOT NULL,\n\
         \"region\" CHAR(50) NOT NULL,\n\
         \n\
         PRIMARY KEY (\"code\", \n\
         \"region\"))"
    );
}

#[tokio::test]
async fn test_key_length_limit_is_configurable() {
    let conn = composite_key_table();
    let config = DdlConfig::default()
        .with_mysql_key_length_limit(767)
        .with_mysql_table_options("");

    let ddl = TableDdlBuilder::new(&conn)
        .with_config(config)
        .mysql_table_def(DATABASE, TABLE)
        .await
        .unwrap();

    assert!(ddl.ends_with("PRIMARY KEY (`code`, \n`region`))"));
}

#[tokio::test]
async fn test_mssql_source_resolves_datetimes_and_key_fallback() {
    let conn = scripted_table(
        Dialect::MsSql,
        &[
            ScriptedColumn::mssql("guid", "uniqueidentifier").distinct(50),
            ScriptedColumn::mssql("seen_at", "datetime2")
                .field("SCALE", Value::Int64(3))
                .distinct(50)
                .time_of_day(2),
        ],
        &[],
        &[],
    );

    let ddl = TableDdlBuilder::new(&conn)
        .mysql_table_def(DATABASE, TABLE)
        .await
        .unwrap();

    assert_eq!(
        ddl,
        indoc! {"
            CREATE TABLE `items` (
            `guid` CHAR(36) NOT NULL,
            `seen_at` DATETIME(3) NOT NULL) ENGINE=InnoDB ROW_FORMAT=COMPRESSED"}
    );
    assert_eq!(conn.call_count("DATA_TYPE = 'uniqueidentifier'"), 2);
}

#[tokio::test]
async fn test_unmappable_column_aborts_render() {
    let conn = scripted_table(
        Dialect::MySql,
        &[
            ScriptedColumn::mysql("id", "int", "int(11)").distinct(10),
            ScriptedColumn::mysql("shape", "geometry", "geometry").distinct(10),
        ],
        &["id"],
        &[],
    );

    let err = TableDdlBuilder::new(&conn)
        .oracle_table_def(DATABASE, TABLE)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DdlError::UnsupportedType { ref type_name, target: TargetDialect::Oracle } if type_name == "GEOMETRY"
    ));
    assert_eq!(conn.call_count(&catalog::primary_key_sql(Dialect::MySql)), 0);
}

#[tokio::test]
async fn test_rendering_is_deterministic() {
    let conn = orders_table();
    let builder = TableDdlBuilder::new(&conn);

    let first = builder.build(DATABASE, TABLE, TargetDialect::MySql).await.unwrap();
    let second = builder.build(DATABASE, TABLE, TargetDialect::MySql).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_columns_exposes_metadata() {
    let conn = orders_table();

    let columns = TableDdlBuilder::new(&conn)
        .columns(DATABASE, TABLE)
        .await
        .unwrap();

    assert_eq!(columns.len(), 6);
    assert_eq!(columns["legacy"].distinct_value_count(), 1);
    assert_eq!(columns["price"].scale(), Some(2));
}

fn wide_index_table() -> MockConnection {
    scripted_table(
        Dialect::MySql,
        &[
            ScriptedColumn::mysql("code", "varchar", "varchar(120)")
                .field("CHARACTER_MAXIMUM_LENGTH", Value::Int64(120))
                .distinct(100),
            ScriptedColumn::mysql("label", "varchar", "varchar(100)")
                .field("CHARACTER_MAXIMUM_LENGTH", Value::Int64(100))
                .distinct(100),
            ScriptedColumn::mysql("qty", "int", "int(11)")
                .field("NUMERIC_PRECISION", Value::Int64(10))
                .distinct(100),
        ],
        &[],
        &[
            ("idx_code_label", "code"),
            ("idx_code_label", "label"),
            ("idx_qty_code", "qty"),
            ("idx_qty_code", "code"),
        ],
    )
}

#[tokio::test]
async fn test_long_mysql_index_is_skipped() {
    let conn = wide_index_table();

    let ddl = TableDdlBuilder::new(&conn)
        .mysql_table_def(DATABASE, TABLE)
        .await
        .unwrap();

    assert_eq!(
        ddl,
        indoc! {"
            CREATE TABLE `items` (
            `code` VARCHAR(120) NOT NULL,
            `label` VARCHAR(100) NOT NULL,
            `qty` INT NOT NULL,
            KEY `idx_qty_code` (`qty`, `code`)) ENGINE=InnoDB ROW_FORMAT=COMPRESSED"}
    );
}

#[tokio::test]
async fn test_oracle_keeps_multi_column_index_order() {
    let conn = wide_index_table();

    let ddl = TableDdlBuilder::new(&conn)
        .oracle_table_def(DATABASE, TABLE)
        .await
        .unwrap();

    assert_eq!(
        ddl,
        indoc! {r#"
            CREATE TABLE "items" (
            "code" NVARCHAR(120) NOT NULL,
            "label" NVARCHAR(100) NOT NULL,
            "qty" NUMBER(10) NOT NULL,
            KEY "idx_code_label" ("code", "label"),
            KEY "idx_qty_code" ("qty", "code"))"#}
    );
}

#[tokio::test]
async fn test_declared_enum_and_set_domains() {
    let conn = scripted_table(
        Dialect::MySql,
        &[
            ScriptedColumn::mysql("kind", "enum", "enum('small','Large','medium')")
                .declared("enum('small','Large','medium')")
                .distinct(3),
            ScriptedColumn::mysql("flags", "set", "set('b','a')")
                .nullable()
                .declared("set('b','a')")
                .distinct(4),
        ],
        &[],
        &[],
    );

    let ddl = TableDdlBuilder::new(&conn)
        .mysql_table_def(DATABASE, TABLE)
        .await
        .unwrap();

    assert_eq!(
        ddl,
        indoc! {"
            CREATE TABLE `items` (
            `kind` ENUM('Large', 'medium', 'small') NOT NULL,
            `flags` SET('a', 'b') NULL) ENGINE=InnoDB ROW_FORMAT=COMPRESSED"}
    );
    assert_eq!(conn.call_count("SHOW COLUMNS FROM `shop`.`items`"), 2);
}

#[tokio::test]
async fn test_mssql_float_keeps_its_precision() {
    let conn = scripted_table(
        Dialect::MsSql,
        &[ScriptedColumn::mssql("ratio", "float")
            .field("NUMERIC_PRECISION", Value::Int64(53))
            .distinct(50)],
        &[],
        &[],
    );

    let ddl = TableDdlBuilder::new(&conn)
        .mysql_table_def(DATABASE, TABLE)
        .await
        .unwrap();

    assert_eq!(
        ddl,
        indoc! {"
            CREATE TABLE `items` (
            `ratio` FLOAT(53) NOT NULL) ENGINE=InnoDB ROW_FORMAT=COMPRESSED"}
    );
}
