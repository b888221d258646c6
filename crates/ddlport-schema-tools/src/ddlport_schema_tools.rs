//! ddlport Schema Tools - cross-dialect CREATE TABLE generation
//!
//! This crate provides functionality for:
//! - Sampling live column data (distinct counts, bounds, time-of-day probes)
//! - Building immutable per-column metadata from catalog and sampled facts
//! - Mapping MySQL, Oracle and SQL Server types to MySQL and Oracle targets
//! - Rendering column clauses and complete `CREATE TABLE` statements

pub mod ddl;
mod error;
pub mod mapper;
pub mod metadata;

#[cfg(test)]
mod fixtures;

pub use ddl::*;
pub use error::*;
pub use mapper::*;
pub use metadata::*;
