//! Database access layer.
//!
//! This module provides:
//! - The native client contract the dialect is generic over
//! - Connections with Oracle placeholder translation
//! - The driver and its registry of checked-out connections
//! - Catalog introspection

pub mod connection;
pub mod database;
pub mod driver;
pub mod native;
pub mod registry;
pub mod schema;

pub use connection::OracleConnection;
pub use database::Database;
pub use driver::OracleDriver;
pub use native::{NativePool, NativeResult, NativeSession};
pub use registry::{ConnectionMetadata, ConnectionRegistry};
pub use schema::OracleIntrospector;
