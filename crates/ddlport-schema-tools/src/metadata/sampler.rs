//! Read-only queries against live column data

use ddlport_core::{Connection, ParamKind, QueryResult, Value};

use crate::{ColumnRef, DdlError, DdlResult, SamplingPlan, SourceMapper};

/// Facts learned from the stored data of one column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampledFacts {
    /// `None` when distinct counting was skipped
    pub distinct_value_count: Option<u64>,
    pub min_value: Option<String>,
    pub max_value: Option<String>,
}

/// Issues sampling queries for one column reference
pub struct ValueSampler<'a> {
    conn: &'a dyn Connection,
    column: &'a ColumnRef,
}

impl<'a> ValueSampler<'a> {
    pub fn new(conn: &'a dyn Connection, column: &'a ColumnRef) -> Self {
        Self { conn, column }
    }

    fn quoted_column(&self) -> String {
        self.conn.quote_identifier(&self.column.column)
    }

    fn quoted_table(&self) -> String {
        format!(
            "{}.{}",
            self.conn.quote_identifier(&self.column.database),
            self.conn.quote_identifier(&self.column.table)
        )
    }

    /// Number of `GROUP BY` groups, NULL counting as one
    pub async fn distinct_count(&self) -> DdlResult<u64> {
        let column = self.quoted_column();
        let sql = format!(
            "SELECT COUNT(*) AS COUNT FROM (SELECT {} FROM {} GROUP BY {}) distinctvalues",
            column,
            self.quoted_table(),
            column
        );
        let result = self.conn.query(&sql, &[]).await?;
        count_of(&result)
    }

    /// Smallest and largest non-NULL values as the engine's text
    pub async fn min_max(&self) -> DdlResult<(Option<String>, Option<String>)> {
        let column = self.quoted_column();
        let sql = format!(
            "SELECT MIN({}) AS ROWMIN, MAX({}) AS ROWMAX FROM {} WHERE {} IS NOT NULL",
            column,
            column,
            self.quoted_table(),
            column
        );
        let result = self.conn.query(&sql, &[]).await?;
        Ok(result
            .first()
            .map(|row| (row.text("ROWMIN"), row.text("ROWMAX")))
            .unwrap_or_default())
    }

    /// Number of rows holding a value
    pub async fn non_null_count(&self) -> DdlResult<u64> {
        let sql = format!(
            "SELECT COUNT(*) AS COUNT FROM {} WHERE {} IS NOT NULL",
            self.quoted_table(),
            self.quoted_column()
        );
        let result = self.conn.query(&sql, &[]).await?;
        count_of(&result)
    }

    /// Number of rows whose value has a non-zero time of day
    #[tracing::instrument(skip(self, mapper), fields(column = %self.column))]
    pub async fn time_of_day_count(&self, mapper: &dyn SourceMapper) -> DdlResult<u64> {
        let column = self.quoted_column();
        let sql = format!(
            "SELECT COUNT(*) AS COUNT FROM {} WHERE {} IS NOT NULL AND {}",
            self.quoted_table(),
            column,
            mapper.time_of_day_condition(&column)
        );
        let result = self.conn.query(&sql, &[]).await?;
        count_of(&result)
    }

    /// Distinct non-NULL values in ascending order
    pub async fn distinct_values(&self) -> DdlResult<Vec<String>> {
        let column = self.quoted_column();
        let sql = format!(
            "SELECT DISTINCT {} FROM {} WHERE {} IS NOT NULL ORDER BY {} ASC",
            column,
            self.quoted_table(),
            column,
            column
        );
        let result = self.conn.query(&sql, &[]).await?;
        Ok(result
            .rows
            .iter()
            .filter_map(|row| row.get(0).and_then(Value::as_text))
            .collect())
    }

    /// Declared type string as reported by `SHOW COLUMNS`, e.g. `enum('a','b')`
    pub async fn declared_type(&self) -> DdlResult<Option<String>> {
        let pattern = self
            .conn
            .escape(&Value::from(self.column.column.as_str()), ParamKind::Str)?;
        let sql = format!("SHOW COLUMNS FROM {} LIKE {}", self.quoted_table(), pattern);
        let rows = self.conn.execute(&sql).await?.into_rows();

        // LIKE treats `_` as a wildcard, prefer the exact field
        let exact = rows
            .iter()
            .find(|row| row.text("Field").as_deref() == Some(self.column.column.as_str()));
        Ok(exact.or(rows.first()).and_then(|row| row.text("Type")))
    }

    /// Runs the sampling queries the plan allows.
    ///
    /// When the engine refuses to aggregate the type, the distinct count
    /// becomes the non-NULL row count (at least 1) and no bounds are kept.
    #[tracing::instrument(skip(self, mapper), fields(column = %self.column))]
    pub async fn sample(&self, mapper: &dyn SourceMapper, plan: SamplingPlan) -> DdlResult<SampledFacts> {
        let mut facts = SampledFacts::default();

        if plan.distinct_count {
            match self.distinct_count().await {
                Ok(count) => facts.distinct_value_count = Some(count),
                Err(err) if err.is_aggregation_rejected(mapper) => {
                    return self.fallback_facts().await;
                }
                Err(err) => return Err(err),
            }
        }

        if plan.min_max {
            match self.min_max().await {
                Ok((min, max)) => {
                    facts.min_value = min;
                    facts.max_value = max;
                }
                Err(err) if err.is_aggregation_rejected(mapper) => {
                    return self.fallback_facts().await;
                }
                Err(err) => return Err(err),
            }
        }

        tracing::debug!(
            distinct = ?facts.distinct_value_count,
            has_bounds = facts.min_value.is_some(),
            "sampled column"
        );
        Ok(facts)
    }

    async fn fallback_facts(&self) -> DdlResult<SampledFacts> {
        tracing::warn!(column = %self.column, "aggregation rejected, counting non-null rows instead");
        let count = self.non_null_count().await?;
        Ok(SampledFacts {
            distinct_value_count: Some(count.max(1)),
            min_value: None,
            max_value: None,
        })
    }
}

/// Reads the `COUNT` of a single-row aggregate, which must be a
/// non-negative integer
fn count_of(result: &QueryResult) -> DdlResult<u64> {
    let value = result
        .first()
        .and_then(|row| row.get_by_name("COUNT").or_else(|| row.get(0)));
    value.and_then(Value::as_u64).ok_or_else(|| {
        DdlError::InvalidMetadata(match value {
            Some(value) => format!("COUNT is not a non-negative integer: {}", value),
            None => "COUNT query returned no value".to_string(),
        })
    })
}
