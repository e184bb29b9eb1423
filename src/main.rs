//! oracle-typegen - regenerate Kysely types from a metadata snapshot.
//!
//! The snapshot is the JSON file a library run writes to
//! `metadataOutputPath`, so types can be rebuilt without database access.

use oracle_dialect::config::Config;
use oracle_dialect::generator::{self, GenerateOutcome};
use oracle_dialect::logger::Logger;
use oracle_dialect::models::TableMetadata;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init();
    }
}

#[tokio::main]
async fn main() {
    let config = Config::parse_args();
    init_tracing(&config);
    let log = Logger::current();

    info!(
        metadata = %config.metadata.display(),
        output = %config.output.display(),
        "Starting oracle-typegen v{}",
        env!("CARGO_PKG_VERSION")
    );

    let generator_config = config.generator_config();
    let result = async {
        let tables = generator::read_metadata_snapshot(&config.metadata).await?;
        let mode = generator_config.resolution_mode;
        let selected: Vec<TableMetadata> = tables
            .into_iter()
            .filter(|t| {
                if t.is_view {
                    mode.includes_views()
                } else {
                    mode.includes_tables()
                }
            })
            .collect();
        generator::emit_types(&selected, &generator_config, &log).await
    }
    .await;

    match result {
        Ok(GenerateOutcome::Written) => info!("Done"),
        Ok(GenerateOutcome::Unchanged) => info!("Done, nothing to write"),
        Err(e) => {
            error!(error = %e, "Error generating types");
            std::process::exit(1);
        }
    }
}
