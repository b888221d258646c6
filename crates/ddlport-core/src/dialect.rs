//! SQL dialects understood by ddlport
//!
//! A [`Dialect`] knows the literal syntax of one engine: identifier quoting,
//! bind placeholders and how values are embedded into SQL text.

use serde::{Deserialize, Serialize};

use crate::{DdlportError, Result, Value};

/// Database engines ddlport can read from or render for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    MySql,
    Oracle,
    MsSql,
}

/// How a value should be embedded by [`Dialect::escape`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Rendered bare, must look like an integer
    Int,
    /// Rendered as a quoted string literal
    Str,
    /// Rendered as a hex literal
    Blob,
}

impl Dialect {
    /// Returns the dialect name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Oracle => "oracle",
            Dialect::MsSql => "mssql",
        }
    }

    /// Parses a dialect from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Dialect::MySql),
            "oracle" | "oci" => Some(Dialect::Oracle),
            "mssql" | "sqlserver" | "sql server" | "sqlsrv" => Some(Dialect::MsSql),
            _ => None,
        }
    }

    /// Returns the identifier quote character for this dialect
    pub fn quote_char(&self) -> char {
        match self {
            Dialect::MySql => '`',
            Dialect::Oracle | Dialect::MsSql => '"',
        }
    }

    /// Quotes an identifier, doubling any embedded quote character
    pub fn quote_identifier(&self, name: &str) -> String {
        let quote = self.quote_char();
        let mut quoted = String::with_capacity(name.len() + 2);
        quoted.push(quote);
        for ch in name.chars() {
            if ch == quote {
                quoted.push(quote);
            }
            quoted.push(ch);
        }
        quoted.push(quote);
        quoted
    }

    /// Quotes `schema.table` as a qualified name
    pub fn qualified_name(&self, schema: &str, table: &str) -> String {
        format!(
            "{}.{}",
            self.quote_identifier(schema),
            self.quote_identifier(table)
        )
    }

    /// Bind placeholder for the 1-based parameter `index`
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::MySql => "?".to_string(),
            Dialect::Oracle => format!(":{}", index),
            Dialect::MsSql => format!("@P{}", index),
        }
    }

    /// Embeds `value` into SQL text as a literal of the given kind.
    ///
    /// `Value::Null` always renders as `NULL`.
    pub fn escape(&self, value: &Value, kind: ParamKind) -> Result<String> {
        if value.is_null() {
            return Ok("NULL".to_string());
        }

        match kind {
            ParamKind::Int => {
                let text = value.to_string();
                if !is_integer_literal(&text) {
                    return Err(DdlportError::ParameterType {
                        value: text,
                        expected: "an integer".to_string(),
                    });
                }
                Ok(text)
            }
            ParamKind::Str => match value {
                Value::Bytes(bytes) => {
                    let text = std::str::from_utf8(bytes).map_err(|_| {
                        DdlportError::ParameterType {
                            value: value.to_string(),
                            expected: "UTF-8 text".to_string(),
                        }
                    })?;
                    Ok(self.quote_string(text))
                }
                other => Ok(self.quote_string(&other.to_string())),
            },
            ParamKind::Blob => {
                let bytes = match value {
                    Value::Bytes(bytes) => bytes.clone(),
                    other => other.to_string().into_bytes(),
                };
                Ok(self.hex_literal(&bytes))
            }
        }
    }

    /// Quotes text as a string literal
    pub fn quote_string(&self, text: &str) -> String {
        match self {
            Dialect::MySql => format!("'{}'", escape_mysql_string(text)),
            Dialect::Oracle | Dialect::MsSql => format!("'{}'", text.replace('\'', "''")),
        }
    }

    fn hex_literal(&self, bytes: &[u8]) -> String {
        if bytes.is_empty() {
            return "''".to_string();
        }
        let encoded = hex::encode_upper(bytes);
        match self {
            Dialect::MySql | Dialect::MsSql => format!("0x{}", encoded),
            Dialect::Oracle => format!("HEXTORAW('{}')", encoded),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Backslash-escapes the characters MySQL treats specially inside a
/// single-quoted literal
pub fn escape_mysql_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\0' => escaped.push_str("\\0"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\u{1a}' => escaped.push_str("\\Z"),
            other => escaped.push(other),
        }
    }
    escaped
}
