//! DDL rendering for target dialects

mod column;
mod config;
mod table;

#[cfg(test)]
mod table_tests;

pub use column::*;
pub use config::*;
pub use table::*;
