//! ddlport core - connection contract and shared types
//!
//! This crate defines what the schema tools need from a database:
//!
//! - `Connection` - parameterized queries, literal execution and catalog listing
//! - `Dialect` - identifier quoting, placeholders and literal escaping per engine
//! - `Value`, `Row`, `QueryResult` - rows as returned by catalog and sampling queries
//! - `MockConnection` - a scripted connection (feature `test-support`)

pub mod catalog;
mod connection;
mod dialect;
mod error;
#[cfg(any(test, feature = "test-support"))]
mod mock;
mod types;

pub use connection::*;
pub use dialect::*;
pub use error::*;
#[cfg(any(test, feature = "test-support"))]
pub use mock::*;
pub use types::*;
