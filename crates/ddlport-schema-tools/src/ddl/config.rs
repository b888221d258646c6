//! Options controlling table DDL generation

use serde::{Deserialize, Serialize};

use crate::{DdlError, DdlResult};

/// Configuration for [`super::TableDdlBuilder`].
///
/// Loadable from TOML; missing keys keep their defaults:
///
/// ```toml
/// skip_unused_columns = false
/// mysql_key_length_limit = 767
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DdlConfig {
    /// Drop columns holding at most one distinct value
    pub skip_unused_columns: bool,
    /// Longest combined key length MySQL accepts for a key or index
    pub mysql_key_length_limit: i64,
    /// Character columns with at most this many distinct values become `ENUM`
    pub enum_max_distinct: u64,
    /// Character columns must be declared shorter than this to become `ENUM`
    pub enum_max_length: i64,
    /// Appended after the closing parenthesis of MySQL tables
    pub mysql_table_options: String,
}

impl Default for DdlConfig {
    fn default() -> Self {
        Self {
            skip_unused_columns: true,
            mysql_key_length_limit: 191,
            enum_max_distinct: 16,
            enum_max_length: 64,
            mysql_table_options: "ENGINE=InnoDB ROW_FORMAT=COMPRESSED".to_string(),
        }
    }
}

impl DdlConfig {
    /// Creates a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a config from TOML text
    pub fn from_toml_str(text: &str) -> DdlResult<Self> {
        let config: DdlConfig =
            toml::from_str(text).map_err(|e| DdlError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that limits are usable
    pub fn validate(&self) -> DdlResult<()> {
        if self.mysql_key_length_limit <= 0 {
            return Err(DdlError::InvalidConfig(format!(
                "mysql_key_length_limit must be positive, got {}",
                self.mysql_key_length_limit
            )));
        }
        if self.enum_max_length <= 0 {
            return Err(DdlError::InvalidConfig(format!(
                "enum_max_length must be positive, got {}",
                self.enum_max_length
            )));
        }
        Ok(())
    }

    /// Sets whether unused columns are dropped
    pub fn with_skip_unused_columns(mut self, skip: bool) -> Self {
        self.skip_unused_columns = skip;
        self
    }

    /// Sets the MySQL key length limit
    pub fn with_mysql_key_length_limit(mut self, limit: i64) -> Self {
        self.mysql_key_length_limit = limit;
        self
    }

    /// Sets the enum detection thresholds
    pub fn with_enum_thresholds(mut self, max_distinct: u64, max_length: i64) -> Self {
        self.enum_max_distinct = max_distinct;
        self.enum_max_length = max_length;
        self
    }

    /// Sets the MySQL table options suffix
    pub fn with_mysql_table_options(mut self, options: impl Into<String>) -> Self {
        self.mysql_table_options = options.into();
        self
    }
}
