//! Schema-related data models.
//!
//! This module defines the metadata produced by catalog introspection. Values
//! are rebuilt on every introspection call and serialize into the metadata
//! snapshot written next to the generated types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMetadata {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    pub schema: String,
    pub name: String,
    pub is_view: bool,
    pub columns: Vec<ColumnMetadata>,
}

impl TableMetadata {
    /// Create table metadata without columns.
    pub fn new(schema: impl Into<String>, name: impl Into<String>, is_view: bool) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            is_view,
            columns: Vec::new(),
        }
    }

    /// Set the column list.
    pub fn with_columns(mut self, columns: Vec<ColumnMetadata>) -> Self {
        self.columns = columns;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    pub name: String,
    /// Oracle type name as reported by `ALL_TAB_COLUMNS.DATA_TYPE`
    pub data_type: String,
    pub is_nullable: bool,
    pub has_default_value: bool,
    pub is_auto_incrementing: bool,
    /// Bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_length: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_precision: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_scale: Option<i64>,
}

impl ColumnMetadata {
    /// Create a non-nullable column without default or identity.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: false,
            has_default_value: false,
            is_auto_incrementing: false,
            data_length: None,
            data_precision: None,
            data_scale: None,
        }
    }

    /// Set whether the column accepts NULL.
    pub fn nullable(mut self, is_nullable: bool) -> Self {
        self.is_nullable = is_nullable;
        self
    }

    /// Set whether the column has a default expression.
    pub fn with_default(mut self, has_default_value: bool) -> Self {
        self.has_default_value = has_default_value;
        self
    }

    /// Set whether the column is an identity column.
    pub fn auto_incrementing(mut self, is_auto_incrementing: bool) -> Self {
        self.is_auto_incrementing = is_auto_incrementing;
        self
    }
}

/// Which catalog objects to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    #[default]
    Tables,
    Views,
    Both,
}

impl ResolutionMode {
    pub fn includes_tables(self) -> bool {
        matches!(self, Self::Tables | Self::Both)
    }

    pub fn includes_views(self) -> bool {
        matches!(self, Self::Views | Self::Both)
    }
}

impl std::fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tables => write!(f, "tables"),
            Self::Views => write!(f, "views"),
            Self::Both => write!(f, "both"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataOptions {
    pub resolution_mode: ResolutionMode,
}

/// Tables first, then views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseMetadata {
    pub tables: Vec<TableMetadata>,
}
