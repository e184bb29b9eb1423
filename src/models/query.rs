//! Query-related data models.
//!
//! This module defines the compiled query handed from the query compiler to a
//! connection, the bind values it carries, and the result shape returned to
//! callers.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// One result row, keyed by lower-cased column name.
pub type Row = serde_json::Map<String, JsonValue>;

/// A parameter value for parameterized queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryParam {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (stored as i64 for maximum range)
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
}

impl QueryParam {
    /// Render the value as an inline SQL literal for log output.
    ///
    /// Strings are wrapped in single quotes without escaping; the result must
    /// never be executed.
    pub fn to_log_literal(&self) -> String {
        match self {
            Self::String(s) => format!("'{}'", s),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for QueryParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for QueryParam {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for QueryParam {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for QueryParam {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for QueryParam {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for QueryParam {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<QueryParam>> From<Option<T>> for QueryParam {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// SQL text with generic `$N` placeholders plus its ordered bind values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledQuery {
    pub sql: String,
    #[serde(default)]
    pub parameters: Vec<QueryParam>,
}

impl CompiledQuery {
    /// Create a compiled query without parameters.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            parameters: Vec::new(),
        }
    }

    /// Create a compiled query with parameters.
    pub fn new(sql: impl Into<String>, parameters: Vec<QueryParam>) -> Self {
        Self {
            sql: sql.into(),
            parameters,
        }
    }
}

/// SQL rewritten for Oracle together with the bind values to send.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedQuery {
    pub sql: String,
    pub bind_params: Vec<QueryParam>,
}

/// Result of executing a query through a connection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    /// Absent when the statement does not report affected rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_affected_rows: Option<u64>,
}

/// Options forwarded to every native `execute` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecuteOptions {
    /// Commit after each statement; the native client decides when absent
    #[serde(default)]
    pub auto_commit: Option<bool>,
    /// Rows fetched per round trip; the native client decides when absent
    #[serde(default)]
    pub fetch_array_size: Option<u32>,
}
