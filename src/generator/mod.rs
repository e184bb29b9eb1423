//! TypeScript type generation from catalog metadata.
//!
//! [`generate`] is the fire-and-forget entry point: it introspects, renders,
//! formats and writes, and reports failures only through the logger.
//! [`try_generate`] does the same work but returns the error.

pub mod diff;
pub mod format;
pub mod naming;
pub mod type_map;
pub mod types;

pub use diff::check_diff;
pub use format::{
    BuiltinFormatter, CommandFormatter, EndOfLine, Formatter, FormatterOptions, format_types,
};
pub use naming::{camel_case, pascal_case};
pub use type_map::map_data_type;
pub use types::{TableTypes, generate_database_types, generate_field_types, generate_table_types};

use crate::config::{DialectConfig, GeneratorConfig};
use crate::db::NativePool;
use crate::dialect::OracleDialect;
use crate::error::DbResult;
use crate::logger::Logger;
use crate::models::{MetadataOptions, TableMetadata};
use chrono::Utc;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// What a run did with the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    Written,
    /// Diff-check found nothing new below the header
    Unchanged,
}

/// Introspect, render and write types. Errors are logged, never returned.
pub async fn generate<P: NativePool>(config: DialectConfig<P>) {
    let log = config.logger.clone();
    if let Err(e) = try_generate(config).await {
        log.scope(|| error!(error = %e, "Error generating types"));
    }
}

/// Like [`generate`], but returns the failure. The driver is destroyed on
/// every path.
pub async fn try_generate<P: NativePool>(config: DialectConfig<P>) -> DbResult<GenerateOutcome> {
    let generator = config.generator.clone().unwrap_or_default();
    let log = config.logger.clone();
    let dialect = OracleDialect::new(config);
    let db = dialect.create_database();
    let introspector = dialect.create_introspector(db.clone());

    let result = async {
        let metadata = introspector
            .get_metadata(MetadataOptions {
                resolution_mode: generator.resolution_mode,
            })
            .await?;
        if let Some(path) = &generator.metadata_output_path {
            write_metadata_snapshot(path, &metadata.tables).await?;
            log.scope(|| debug!(path = %path.display(), "Metadata snapshot written"));
        }
        emit_types(&metadata.tables, &generator, &log).await
    }
    .await;

    db.destroy().await;
    result
}

/// Render, format and persist types for already-resolved metadata.
pub async fn emit_types(
    tables: &[TableMetadata],
    config: &GeneratorConfig,
    log: &Logger,
) -> DbResult<GenerateOutcome> {
    let table_types = generate_table_types(tables, config.use_naming_convention)?;
    let document = generate_database_types(&table_types, Utc::now());
    let formatter = Formatter::from_config(&config.formatter);
    let formatted = format_types(&document, &formatter).await?;
    let path = config.output_path_or_default();

    if config.diff_check {
        match diff::read_existing(&path).await? {
            Some(existing) if !check_diff(&existing, &formatted) => {
                log.scope(|| info!("Types have not changed"));
                return Ok(GenerateOutcome::Unchanged);
            }
            Some(_) => log.scope(|| warn!("Types have changed. Updating types file...")),
            None => log.scope(|| debug!(path = %path.display(), "No previous types file")),
        }
    }

    diff::write_output(&path, &formatted).await?;
    log.scope(|| {
        info!(
            path = %path.display(),
            tables = table_types.len(),
            "Types updated successfully"
        )
    });
    Ok(GenerateOutcome::Written)
}

/// Pretty JSON of the raw table and column metadata.
pub async fn write_metadata_snapshot(path: &Path, tables: &[TableMetadata]) -> DbResult<()> {
    let json = serde_json::to_string_pretty(tables)?;
    diff::write_output(path, &json).await
}

/// Read a snapshot written by [`write_metadata_snapshot`].
pub async fn read_metadata_snapshot(path: &Path) -> DbResult<Vec<TableMetadata>> {
    let json = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&json)?)
}
