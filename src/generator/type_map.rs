//! Oracle data type to TypeScript type mapping.

use crate::error::{DbError, DbResult};

const TYPE_MAP: &[(&str, &str)] = &[
    ("VARCHAR2", "string"),
    ("NVARCHAR2", "string"),
    ("VARCHAR", "string"),
    ("CHAR", "string"),
    ("NCHAR", "string"),
    ("CLOB", "string"),
    ("NCLOB", "string"),
    ("LONG", "string"),
    ("ROWID", "string"),
    ("UROWID", "string"),
    ("NUMBER", "number"),
    ("FLOAT", "number"),
    ("INTEGER", "number"),
    ("BINARY_FLOAT", "number"),
    ("BINARY_DOUBLE", "number"),
    ("DATE", "string"),
    ("TIMESTAMP", "string"),
    ("TIMESTAMP WITH TIME ZONE", "string"),
    ("TIMESTAMP WITH LOCAL TIME ZONE", "string"),
    ("INTERVAL YEAR TO MONTH", "string"),
    ("INTERVAL DAY TO SECOND", "string"),
    ("RAW", "Buffer"),
    ("LONG RAW", "Buffer"),
    ("BLOB", "Buffer"),
    ("BFILE", "Buffer"),
    ("BOOLEAN", "boolean"),
    ("JSON", "unknown"),
    ("XMLTYPE", "string"),
];

/// Look up the TypeScript type for an Oracle column type.
///
/// Precision and scale are ignored, so `TIMESTAMP(6) WITH TIME ZONE` maps
/// like `TIMESTAMP WITH TIME ZONE`.
pub fn map_data_type(data_type: &str) -> DbResult<&'static str> {
    let normalized = normalize(data_type);
    TYPE_MAP
        .iter()
        .find(|(oracle, _)| *oracle == normalized)
        .map(|(_, ts)| *ts)
        .ok_or_else(|| DbError::unsupported_data_type(data_type))
}

fn normalize(data_type: &str) -> String {
    let mut stripped = String::with_capacity(data_type.len());
    let mut depth = 0usize;
    for c in data_type.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => stripped.push(c),
            _ => {}
        }
    }
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}
