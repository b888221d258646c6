use ddlport_core::{Connection, Dialect, MockConnection, QueryResult, Value};

use super::*;
use crate::fixtures::{DATABASE, ScriptedColumn, TABLE, initialize_logging, scripted_table};
use crate::{DdlError, TargetDialect, source_mapper};

fn column_ref(name: &str) -> ColumnRef {
    ColumnRef::new(DATABASE, TABLE, name)
}

async fn fetch(conn: &MockConnection, name: &str) -> crate::DdlResult<ColumnMetadata> {
    let mapper = source_mapper(conn.dialect());
    ColumnMetadata::fetch(conn, mapper.as_ref(), column_ref(name)).await
}

mod fetch_tests {
    use super::*;

    #[tokio::test]
    async fn test_mysql_column_combines_catalog_and_samples() {
        initialize_logging();
        let conn = ScriptedColumn::mysql("qty", "int", "int(10) unsigned")
            .field("NUMERIC_PRECISION", Value::Int64(10))
            .field("SCALE", Value::Int64(0))
            .nullable()
            .distinct(42)
            .bounds(Value::Int64(0), Value::Int64(900))
            .script(MockConnection::new(Dialect::MySql));

        let column = fetch(&conn, "qty").await.unwrap();

        assert_eq!(column.name(), "qty");
        assert_eq!(column.source(), Dialect::MySql);
        assert_eq!(column.original_type(), "INT UNSIGNED");
        assert_eq!(column.length(), 10);
        assert_eq!(column.precision(), Some(10));
        assert_eq!(column.scale(), Some(0));
        assert!(column.is_nullable());
        assert_eq!(column.distinct_value_count(), 42);
        assert_eq!(column.min_value(), Some("0"));
        assert_eq!(column.max_value(), Some("900"));
        assert_eq!(column.column_ref().to_string(), "shop.items.qty");
    }

    #[tokio::test]
    async fn test_missing_catalog_entry() {
        let mapper = source_mapper(Dialect::MySql);
        let conn = MockConnection::new(Dialect::MySql).on(
            mapper.catalog_sql(),
            QueryResult::from_rows(["DATA_TYPE"], Vec::new()),
        );

        let err = fetch(&conn, "ghost").await.unwrap_err();

        assert!(matches!(err, DdlError::ColumnNotFound { ref column } if column == "shop.items.ghost"));
    }

    #[tokio::test]
    async fn test_catalog_query_binds_reference() {
        let conn = ScriptedColumn::oracle("NAME", "VARCHAR2")
            .field("CHAR_LENGTH", Value::Int64(30))
            .script(MockConnection::new(Dialect::Oracle));

        fetch(&conn, "NAME").await.unwrap();

        let first = &conn.calls()[0];
        assert!(first.sql.contains("ALL_TAB_COLUMNS"));
        assert_eq!(
            first.params,
            vec![Value::from(DATABASE), Value::from(TABLE), Value::from("NAME")]
        );
    }

    #[tokio::test]
    async fn test_sampling_queries_quote_identifiers() {
        let conn = ScriptedColumn::mssql("Total", "money")
            .bounds("1.50", "99.00")
            .script(MockConnection::new(Dialect::MsSql));

        let column = fetch(&conn, "Total").await.unwrap();

        assert_eq!(column.min_value(), Some("1.50"));
        assert_eq!(conn.call_count("FROM \"shop\".\"items\""), 2);
        assert_eq!(conn.call_count("GROUP BY \"Total\""), 1);
    }
}

mod sampling_plan_tests {
    use super::*;

    #[tokio::test]
    async fn test_mssql_large_objects_skip_sampling() {
        let conn = ScriptedColumn::mssql("notes", "ntext").script(MockConnection::new(Dialect::MsSql));

        let column = fetch(&conn, "notes").await.unwrap();

        assert_eq!(column.distinct_value_count(), u64::MAX);
        assert_eq!(column.min_value(), None);
        assert_eq!(conn.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_mssql_uniqueidentifier_skips_bounds_only() {
        let conn = ScriptedColumn::mssql("guid", "uniqueidentifier")
            .distinct(7)
            .script(MockConnection::new(Dialect::MsSql));

        let column = fetch(&conn, "guid").await.unwrap();

        assert_eq!(column.length(), 36);
        assert_eq!(column.distinct_value_count(), 7);
        assert_eq!(column.max_value(), None);
        assert_eq!(conn.call_count("MIN("), 0);
    }

    #[tokio::test]
    async fn test_oracle_long_falls_back_to_non_null_count() {
        initialize_logging();
        let conn = ScriptedColumn::oracle("BODY", "LONG")
            .rejected("ORA-00997: illegal use of LONG datatype", 0)
            .script(MockConnection::new(Dialect::Oracle));

        let column = fetch(&conn, "BODY").await.unwrap();

        assert_eq!(column.distinct_value_count(), 1);
        assert_eq!(column.min_value(), None);
        assert_eq!(column.max_value(), None);
        assert_eq!(conn.call_count("MIN("), 0);
    }

    #[tokio::test]
    async fn test_fallback_keeps_non_null_count() {
        let conn = ScriptedColumn::oracle("BODY", "LONG")
            .rejected("ORA-00997: illegal use of LONG datatype", 12)
            .script(MockConnection::new(Dialect::Oracle));

        let column = fetch(&conn, "BODY").await.unwrap();

        assert_eq!(column.distinct_value_count(), 12);
    }

    #[tokio::test]
    async fn test_other_sampling_errors_propagate() {
        let conn = ScriptedColumn::oracle("BODY", "CLOB")
            .rejected("ORA-00932: inconsistent datatypes", 5)
            .script(MockConnection::new(Dialect::Oracle));

        let err = fetch(&conn, "BODY").await.unwrap_err();

        assert!(matches!(err, DdlError::Core(_)));
        assert!(err.to_string().contains("ORA-00932"));
    }
}

mod resolve_type_tests {
    use super::*;

    async fn resolve(conn: &MockConnection, name: &str, target: TargetDialect) -> String {
        let mapper = source_mapper(conn.dialect());
        let column = fetch(conn, name).await.unwrap();
        column
            .resolve_type(conn, mapper.as_ref(), target)
            .await
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_oracle_date_with_time_of_day() {
        let conn = ScriptedColumn::oracle("CREATED", "DATE")
            .time_of_day(3)
            .script(MockConnection::new(Dialect::Oracle));

        assert_eq!(resolve(&conn, "CREATED", TargetDialect::MySql).await, "DATETIME");
        assert_eq!(conn.call_count("TO_CHAR(\"CREATED\", 'SSSSS') > 0"), 1);
    }

    #[tokio::test]
    async fn test_oracle_date_without_time_of_day() {
        let conn = ScriptedColumn::oracle("CREATED", "DATE")
            .time_of_day(0)
            .script(MockConnection::new(Dialect::Oracle));

        assert_eq!(resolve(&conn, "CREATED", TargetDialect::MySql).await, "DATE");
    }

    #[tokio::test]
    async fn test_mssql_datetime_probe() {
        let conn = ScriptedColumn::mssql("seen_at", "datetime")
            .time_of_day(1)
            .script(MockConnection::new(Dialect::MsSql));

        assert_eq!(resolve(&conn, "seen_at", TargetDialect::MySql).await, "DATETIME");
        assert_eq!(conn.call_count("CONVERT(VARCHAR(8), \"seen_at\", 108)"), 1);
    }

    #[tokio::test]
    async fn test_probe_only_when_needed() {
        let conn = ScriptedColumn::oracle("CREATED", "DATE").script(MockConnection::new(Dialect::Oracle));

        assert_eq!(resolve(&conn, "CREATED", TargetDialect::Oracle).await, "DATE");
        assert_eq!(conn.call_count("SSSSS"), 0);
    }

    #[tokio::test]
    async fn test_mapping_failure_is_returned() {
        let conn = ScriptedColumn::mysql("shape", "geometry", "geometry").script(MockConnection::new(Dialect::MySql));
        let mapper = source_mapper(Dialect::MySql);
        let column = fetch(&conn, "shape").await.unwrap();

        let err = column
            .resolve_type(&conn, mapper.as_ref(), TargetDialect::Oracle)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Unsupported type 'GEOMETRY' for oracle target");
    }
}

mod sampler_tests {
    use super::*;

    #[tokio::test]
    async fn test_distinct_values_skip_nulls() {
        let conn = ScriptedColumn::mysql("status", "varchar", "varchar(12)")
            .values(&["new", "paid", "shipped"])
            .script(MockConnection::new(Dialect::MySql));
        let reference = column_ref("status");

        let values = ValueSampler::new(&conn, &reference).distinct_values().await.unwrap();

        assert_eq!(values, vec!["new", "paid", "shipped"]);
        let calls = conn.calls();
        assert_eq!(
            calls[0].sql,
            "SELECT DISTINCT `status` FROM `shop`.`items` WHERE `status` IS NOT NULL ORDER BY `status` ASC"
        );
    }

    #[tokio::test]
    async fn test_declared_type_prefers_exact_field() {
        let conn = MockConnection::new(Dialect::MySql).on(
            "SHOW COLUMNS FROM `shop`.`items` LIKE 'a_b'",
            QueryResult::from_rows(
                ["Field", "Type"],
                vec![
                    vec![Value::from("axb"), Value::from("int(11)")],
                    vec![Value::from("a_b"), Value::from("enum('x','y')")],
                ],
            ),
        );
        let reference = column_ref("a_b");

        let declared = ValueSampler::new(&conn, &reference).declared_type().await.unwrap();

        assert_eq!(declared.as_deref(), Some("enum('x','y')"));
    }

    #[tokio::test]
    async fn test_sampled_facts_without_rows() {
        let conn = MockConnection::new(Dialect::MySql)
            .on_row("(SELECT `empty` FROM", ["COUNT"], vec![Value::Int64(0)])
            .on_row("MIN(`empty`)", ["ROWMIN", "ROWMAX"], vec![Value::Null, Value::Null]);
        let reference = column_ref("empty");
        let mapper = source_mapper(Dialect::MySql);

        let facts = ValueSampler::new(&conn, &reference)
            .sample(mapper.as_ref(), crate::SamplingPlan::FULL)
            .await
            .unwrap();

        assert_eq!(
            facts,
            SampledFacts {
                distinct_value_count: Some(0),
                min_value: None,
                max_value: None,
            }
        );
    }
}

mod count_tests {
    use super::*;

    #[tokio::test]
    async fn test_non_integer_count_is_an_error() {
        let conn = MockConnection::new(Dialect::MySql)
            .on_row("(SELECT `ratio` FROM", ["COUNT"], vec![Value::Float64(5.0)]);
        let reference = column_ref("ratio");

        let err = ValueSampler::new(&conn, &reference)
            .distinct_count()
            .await
            .unwrap_err();

        assert!(matches!(err, DdlError::InvalidMetadata(_)));
        assert_eq!(
            err.to_string(),
            "Invalid column metadata: COUNT is not a non-negative integer: 5"
        );
    }

    #[tokio::test]
    async fn test_missing_count_row_is_an_error() {
        let conn = MockConnection::new(Dialect::MySql).on(
            "WHERE `ratio` IS NOT NULL",
            QueryResult::from_rows(["COUNT"], Vec::new()),
        );
        let reference = column_ref("ratio");

        let err = ValueSampler::new(&conn, &reference)
            .non_null_count()
            .await
            .unwrap_err();

        assert!(matches!(err, DdlError::InvalidMetadata(_)));
    }

    #[tokio::test]
    async fn test_null_count_fails_fetch() {
        let mapper = source_mapper(Dialect::MySql);
        let conn = ScriptedColumn::mysql("ratio", "double", "double")
            .script(MockConnection::new(Dialect::MySql))
            .on_row("(SELECT `ratio` FROM `shop`", ["COUNT"], vec![Value::Null]);

        let err = ColumnMetadata::fetch(&conn, mapper.as_ref(), column_ref("ratio"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("COUNT is not a non-negative integer: NULL"));
    }
}

#[tokio::test]
async fn test_fetch_table_columns_keeps_declared_order() {
    let conn = scripted_table(
        Dialect::MySql,
        &[
            ScriptedColumn::mysql("zeta", "int", "int(11)"),
            ScriptedColumn::mysql("alpha", "varchar", "varchar(20)"),
            ScriptedColumn::mysql("mid", "date", "date"),
        ],
        &[],
        &[],
    );
    let mapper = source_mapper(Dialect::MySql);

    let columns = fetch_table_columns(&conn, mapper.as_ref(), DATABASE, TABLE)
        .await
        .unwrap();

    let names: Vec<&str> = columns.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    assert_eq!(columns["alpha"].original_type(), "VARCHAR");
}

#[tokio::test]
async fn test_metadata_serializes_for_reports() {
    let conn = ScriptedColumn::mysql("flag", "tinyint", "tinyint(1)")
        .distinct(2)
        .bounds("0", "1")
        .script(MockConnection::new(Dialect::MySql));

    let column = fetch(&conn, "flag").await.unwrap();
    let json = serde_json::to_value(&column).unwrap();

    assert_eq!(json["original_type"], "TINYINT");
    assert_eq!(json["source"], "mysql");
    assert_eq!(json["column_ref"]["table"], TABLE);
    assert_eq!(json["distinct_value_count"], 2);
    assert_eq!(json["max_value"], "1");
}
