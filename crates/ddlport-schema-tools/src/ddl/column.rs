//! Column clause rendering
//!
//! Formatting is pure: the resolved target type and any enum values are
//! passed in. [`probe_enum_values`] is the only function here that queries.

use ddlport_core::{Connection, escape_mysql_string};

use super::DdlConfig;
use crate::{ColumnMetadata, DdlResult, MappedType, TargetDialect, ValueSampler};

/// Temporal MySQL types that always carry a fractional-seconds suffix
const FRACTIONAL_SECONDS_TYPES: [&str; 3] = ["DATETIME", "TIMESTAMP", "TIME"];

/// MySQL types whose value domain is declared in the type itself
fn is_declared_domain(mysql_type: &MappedType) -> bool {
    matches!(mysql_type.name(), "ENUM" | "SET")
}

/// Whether a character column is small enough to become an `ENUM`
pub fn is_enum_candidate(column: &ColumnMetadata, mysql_type: &MappedType, config: &DdlConfig) -> bool {
    matches!(mysql_type.name(), "CHAR" | "VARCHAR")
        && column.length() < config.enum_max_length
        && column.distinct_value_count() <= config.enum_max_distinct
}

/// Collects the enum domain of a column, if it has one.
///
/// `ENUM` and `SET` columns report their declared domain. Small character
/// columns report the distinct values currently stored. Anything else, or
/// a character column with no stored values, yields an empty list.
#[tracing::instrument(skip_all, fields(column = %column.column_ref()))]
pub async fn probe_enum_values(
    conn: &dyn Connection,
    column: &ColumnMetadata,
    mysql_type: &MappedType,
    config: &DdlConfig,
) -> DdlResult<Vec<String>> {
    let sampler = ValueSampler::new(conn, column.column_ref());

    if is_declared_domain(mysql_type) {
        let declared = sampler.declared_type().await?.unwrap_or_default();
        return Ok(normalize_enum_values(parse_declared_values(&declared)));
    }

    if is_enum_candidate(column, mysql_type, config) {
        let values = sampler
            .distinct_values()
            .await?
            .into_iter()
            .map(|value| value.trim().to_string())
            .collect();
        return Ok(normalize_enum_values(values));
    }

    Ok(Vec::new())
}

/// Drops case-insensitive duplicates, keeping the first spelling, and sorts
/// case-insensitively with a byte-order tie break
pub fn normalize_enum_values(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut unique: Vec<String> = values
        .into_iter()
        .filter(|value| seen.insert(value.to_lowercase()))
        .collect();
    unique.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
    unique
}

/// Extracts the literals of a declared `enum('a','b')` or `set(...)` type
pub fn parse_declared_values(declared: &str) -> Vec<String> {
    let (Some(start), Some(end)) = (declared.find('('), declared.rfind(')')) else {
        return Vec::new();
    };
    if end <= start {
        return Vec::new();
    }

    let mut values = Vec::new();
    let mut chars = declared[start + 1..end].chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\'' {
            continue;
        }
        let mut value = String::new();
        while let Some(ch) = chars.next() {
            match ch {
                '\'' if chars.peek() == Some(&'\'') => {
                    chars.next();
                    value.push('\'');
                }
                '\'' => break,
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        value.push(escaped);
                    }
                }
                other => value.push(other),
            }
        }
        values.push(value);
    }
    values
}

/// Renders `'a', 'b'` for an enum literal list
pub fn enum_literal_list(values: &[String]) -> String {
    values
        .iter()
        .map(|value| format!("'{}'", escape_mysql_string(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn nullability(column: &ColumnMetadata) -> &'static str {
    if column.is_nullable() { " NULL" } else { " NOT NULL" }
}

/// Shared `(precision,scale)` / `(precision)` / `(length)` suffix
fn size_suffix(column: &ColumnMetadata, mapped: &MappedType, skip_date: bool) -> String {
    let scale = column.scale().unwrap_or(0);
    let precision = column.precision().unwrap_or(0);
    let sized = !mapped.is_integer();

    if scale != 0 && precision != 0 && !(skip_date && mapped.name() == "DATE") {
        format!("({},{})", precision, scale)
    } else if precision != 0 && sized {
        format!("({})", precision)
    } else if column.length() > 0 && sized {
        format!("({})", column.length())
    } else {
        String::new()
    }
}

/// Renders one MySQL column clause, e.g. `` `id` INT UNSIGNED NOT NULL ``.
///
/// `enum_values` comes from [`probe_enum_values`].
pub fn render_mysql_column(
    column: &ColumnMetadata,
    mysql_type: &MappedType,
    enum_values: &[String],
) -> String {
    let mut def = format!(
        "{} ",
        TargetDialect::MySql.quote_identifier(&column.name().to_lowercase())
    );

    if is_declared_domain(mysql_type) && !enum_values.is_empty() {
        def.push_str(&format!("{}({})", mysql_type.name(), enum_literal_list(enum_values)));
    } else if matches!(mysql_type.name(), "CHAR" | "VARCHAR") && !enum_values.is_empty() {
        def.push_str(&format!("ENUM({})", enum_literal_list(enum_values)));
    } else if FRACTIONAL_SECONDS_TYPES.contains(&mysql_type.name()) {
        def.push_str(&format!("{}({})", mysql_type.name(), column.scale().unwrap_or(0)));
    } else {
        def.push_str(mysql_type.name());
        def.push_str(&size_suffix(column, mysql_type, true));
        if mysql_type.is_unsigned() {
            def.push_str(" UNSIGNED");
        }
    }

    def.push_str(nullability(column));
    def
}

/// Renders one Oracle column clause, e.g. `"id" NUMBER(10) NOT NULL`
pub fn render_oracle_column(column: &ColumnMetadata, oracle_type: &MappedType) -> String {
    let mut def = format!(
        "{} ",
        TargetDialect::Oracle.quote_identifier(&column.name().to_lowercase())
    );

    let scale = column.scale().unwrap_or(0);
    match oracle_type.name().strip_prefix("TIMESTAMP") {
        // fractional seconds sit right after TIMESTAMP, before any zone clause
        Some(zone) if scale != 0 && column.precision().unwrap_or(0) == 0 => {
            def.push_str(&format!("TIMESTAMP({}){}", scale, zone));
        }
        _ => {
            def.push_str(oracle_type.name());
            def.push_str(&size_suffix(column, oracle_type, false));
        }
    }

    def.push_str(nullability(column));
    def
}
