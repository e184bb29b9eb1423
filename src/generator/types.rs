//! Rendering of metadata into Kysely type declarations.

use super::naming::{camel_case, pascal_case, property_name, type_identifier};
use super::type_map::map_data_type;
use crate::error::DbResult;
use crate::models::{ColumnMetadata, TableMetadata};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

pub const BANNER: &str = "// This file was generated automatically. Please don't edit it manually!";
pub const KYSELY_IMPORT: &str =
    "import type { Generated, Insertable, Selectable, Updateable } from 'kysely'";

/// Declarations for one table or view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableTypes {
    /// Key in the `DB` interface
    pub table: String,
    pub table_type_name: String,
    pub types: String,
}

/// One `name: type` line per column.
pub fn generate_field_types(
    columns: &[ColumnMetadata],
    use_naming_convention: bool,
) -> DbResult<String> {
    let lines = columns
        .iter()
        .map(|column| {
            let base = map_data_type(&column.data_type)?;
            let mut ty = if column.is_nullable {
                format!("{} | null", base)
            } else {
                base.to_string()
            };
            if column.is_auto_incrementing {
                ty = format!("Generated<{}>", ty);
            }
            let name = if use_naming_convention {
                camel_case(&column.name)
            } else {
                column.name.clone()
            };
            Ok(format!("{}: {}", property_name(&name), ty))
        })
        .collect::<DbResult<Vec<_>>>()?;
    Ok(lines.join("\n"))
}

pub fn generate_table_types(
    tables: &[TableMetadata],
    use_naming_convention: bool,
) -> DbResult<Vec<TableTypes>> {
    tables
        .iter()
        .map(|table| {
            let type_name = type_identifier(&pascal_case(&table.name));
            let key = if use_naming_convention {
                camel_case(&table.name)
            } else {
                table.name.clone()
            };
            let fields = generate_field_types(&table.columns, use_naming_convention)?;

            let mut types = format!("export interface {}Table {{\n", type_name);
            if !fields.is_empty() {
                types.push_str(&fields);
                types.push('\n');
            }
            types.push_str(&format!(
                "}}\n\
                 export type {t} = Selectable<{t}Table>\n\
                 export type New{t} = Insertable<{t}Table>\n\
                 export type {t}Update = Updateable<{t}Table>",
                t = type_name
            ));

            Ok(TableTypes {
                table: key,
                table_type_name: type_name,
                types,
            })
        })
        .collect()
}

/// Assemble the full document: banner, timestamp, import, blocks, `DB`.
pub fn generate_database_types(table_types: &[TableTypes], timestamp: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str(BANNER);
    out.push('\n');
    out.push_str(&timestamp_line(timestamp));
    out.push_str("\n\n");
    out.push_str(KYSELY_IMPORT);
    out.push_str("\n\n");

    for block in table_types {
        out.push_str(&block.types);
        out.push_str("\n\n");
    }

    out.push_str("export interface DB {\n");
    for block in table_types {
        out.push_str(&format!(
            "{}: {}Table\n",
            property_name(&block.table),
            block.table_type_name
        ));
    }
    out.push_str("}\n");
    out
}

pub fn timestamp_line(timestamp: DateTime<Utc>) -> String {
    format!(
        "// Timestamp: {}",
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}
