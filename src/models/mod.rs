//! Data models for the Oracle dialect.
//!
//! This module re-exports all model types used throughout the crate.

pub mod query;
pub mod schema;

// Re-export commonly used types
pub use query::{CompiledQuery, ExecuteOptions, FormattedQuery, QueryParam, QueryResult, Row};
pub use schema::{
    ColumnMetadata, DatabaseMetadata, MetadataOptions, ResolutionMode, SchemaMetadata,
    TableMetadata,
};
