//! Error types for the Oracle dialect.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! Library layers (connection, driver, introspector) return these to the caller;
//! only the top-level generator swallows them into the log.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "ORA-00942" for table or view does not exist
        code: Option<String>,
    },

    #[error("Not implemented: {operation}")]
    NotImplemented { operation: String },

    #[error("Unsupported data type: {data_type}")]
    UnsupportedDataType { data_type: String },

    #[error("Unexpected catalog row for {object}: {message}")]
    Schema { message: String, object: String },

    #[error("Format error: {message}")]
    Format { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DbError {
    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a native execution error with an optional Oracle error code.
    pub fn database(message: impl Into<String>, code: Option<String>) -> Self {
        Self::Database {
            message: message.into(),
            code,
        }
    }

    /// Create an error for a capability the dialect does not provide.
    pub fn not_implemented(operation: impl Into<String>) -> Self {
        Self::NotImplemented {
            operation: operation.into(),
        }
    }

    /// Create an error for a column type with no TypeScript mapping.
    pub fn unsupported_data_type(data_type: impl Into<String>) -> Self {
        Self::UnsupportedDataType {
            data_type: data_type.into(),
        }
    }

    /// Create an error for a catalog row missing an expected column.
    pub fn schema(message: impl Into<String>, object: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
            object: object.into(),
        }
    }

    /// Create a formatter error.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// Check if this error reports an unsupported capability.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented { .. })
    }
}

/// Result type alias for dialect operations.
pub type DbResult<T> = Result<T, DbError>;
