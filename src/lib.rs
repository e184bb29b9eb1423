//! Oracle dialect library.
//!
//! This library lets a SQL query builder target Oracle: it rewrites compiled
//! queries into Oracle bind syntax, tracks pooled sessions, reads schema
//! metadata from the data dictionary and generates Kysely TypeScript types
//! from it.

pub mod config;
pub mod db;
pub mod dialect;
pub mod error;
pub mod generator;
pub mod logger;
pub mod models;

pub use config::{DialectConfig, GeneratorConfig, PoolSource, TransactionMode};
pub use dialect::OracleDialect;
pub use error::{DbError, DbResult};
pub use generator::{generate, try_generate};
pub use logger::Logger;
