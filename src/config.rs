//! Configuration handling for the Oracle dialect and the type generator.
//!
//! Library callers build a [`DialectConfig`] in code. The `oracle-typegen`
//! binary parses a [`Config`] from CLI arguments and environment variables.

use crate::error::DbResult;
use crate::generator::FormatterOptions;
use crate::logger::Logger;
use crate::models::{ExecuteOptions, ResolutionMode};
use clap::{Parser, ValueEnum};
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_OUTPUT_PATH: &str = "types.ts";

/// Alias passed to the pool factory.
pub const DEFAULT_POOL_ALIAS: &str = "kysely";

/// Options handed to a pool factory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolOptions {
    pub alias: Option<String>,
}

type PoolFactory<P> = Arc<dyn Fn(PoolOptions) -> BoxFuture<'static, DbResult<P>> + Send + Sync>;

/// Where the driver gets its native pool from.
pub enum PoolSource<P> {
    /// A pool the caller already created.
    Pool(Arc<P>),
    /// Called once on first `init`.
    Factory(PoolFactory<P>),
}

impl<P> PoolSource<P> {
    pub fn factory<F>(f: F) -> Self
    where
        F: Fn(PoolOptions) -> BoxFuture<'static, DbResult<P>> + Send + Sync + 'static,
    {
        Self::Factory(Arc::new(f))
    }
}

impl<P> Clone for PoolSource<P> {
    fn clone(&self) -> Self {
        match self {
            Self::Pool(pool) => Self::Pool(Arc::clone(pool)),
            Self::Factory(f) => Self::Factory(Arc::clone(f)),
        }
    }
}

impl<P> fmt::Debug for PoolSource<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pool(_) => f.write_str("PoolSource::Pool"),
            Self::Factory(_) => f.write_str("PoolSource::Factory"),
        }
    }
}

/// How the driver treats begin/commit/rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionMode {
    /// `begin` is a no-op; commit and rollback go to the native session.
    #[default]
    Native,
    /// Every transaction call fails with `NotImplemented`.
    Unsupported,
}

/// How generated text is pretty-printed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FormatterConfig {
    Builtin(FormatterOptions),
    /// Pipe through an external program, e.g. `prettier --stdin-filepath types.ts`
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self::Builtin(FormatterOptions::default())
    }
}

/// Settings for one type generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Schema allow-list; empty means every schema
    pub schemas: Vec<String>,
    /// Table allow-list; empty means every table
    pub tables: Vec<String>,
    /// View allow-list; empty means every view
    pub views: Vec<String>,
    pub resolution_mode: ResolutionMode,
    /// camelCase field names and table keys
    pub use_naming_convention: bool,
    /// Skip the write when only the timestamp would change
    pub diff_check: bool,
    /// Defaults to `types.ts`
    pub output_path: Option<PathBuf>,
    pub metadata_output_path: Option<PathBuf>,
    pub formatter: FormatterConfig,
}

impl GeneratorConfig {
    pub fn output_path_or_default(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH))
    }
}

/// Everything needed to build an [`OracleDialect`](crate::dialect::OracleDialect).
pub struct DialectConfig<P> {
    pub pool: PoolSource<P>,
    pub logger: Logger,
    pub execute_options: ExecuteOptions,
    pub transaction_mode: TransactionMode,
    pub generator: Option<GeneratorConfig>,
}

impl<P> DialectConfig<P> {
    pub fn new(pool: PoolSource<P>) -> Self {
        Self {
            pool,
            logger: Logger::noop(),
            execute_options: ExecuteOptions::default(),
            transaction_mode: TransactionMode::default(),
            generator: None,
        }
    }

    pub fn with_pool(pool: P) -> Self {
        Self::new(PoolSource::Pool(Arc::new(pool)))
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_execute_options(mut self, options: ExecuteOptions) -> Self {
        self.execute_options = options;
        self
    }

    pub fn with_transaction_mode(mut self, mode: TransactionMode) -> Self {
        self.transaction_mode = mode;
        self
    }

    pub fn with_generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = Some(generator);
        self
    }
}

impl<P> Clone for DialectConfig<P> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            logger: self.logger.clone(),
            execute_options: self.execute_options.clone(),
            transaction_mode: self.transaction_mode,
            generator: self.generator.clone(),
        }
    }
}

impl<P> fmt::Debug for DialectConfig<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialectConfig")
            .field("pool", &self.pool)
            .field("execute_options", &self.execute_options)
            .field("transaction_mode", &self.transaction_mode)
            .field("generator", &self.generator)
            .finish_non_exhaustive()
    }
}

/// Which catalog objects the CLI keeps from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ResolutionArg {
    #[default]
    Tables,
    Views,
    Both,
}

impl From<ResolutionArg> for ResolutionMode {
    fn from(arg: ResolutionArg) -> Self {
        match arg {
            ResolutionArg::Tables => ResolutionMode::Tables,
            ResolutionArg::Views => ResolutionMode::Views,
            ResolutionArg::Both => ResolutionMode::Both,
        }
    }
}

/// Configuration for the `oracle-typegen` binary.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "oracle-typegen",
    about = "Generate Kysely TypeScript types from an Oracle metadata snapshot",
    version,
    author
)]
pub struct Config {
    /// Metadata snapshot (JSON array of tables) written by a previous run
    #[arg(short, long, value_name = "FILE", env = "ORACLE_TYPEGEN_METADATA")]
    pub metadata: PathBuf,

    /// Output file for the generated types
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = DEFAULT_OUTPUT_PATH,
        env = "ORACLE_TYPEGEN_OUTPUT"
    )]
    pub output: PathBuf,

    /// Which catalog objects to emit
    #[arg(
        long,
        value_enum,
        default_value = "tables",
        env = "ORACLE_TYPEGEN_RESOLUTION_MODE"
    )]
    pub resolution_mode: ResolutionArg,

    /// camelCase field names and table keys
    #[arg(long, env = "ORACLE_TYPEGEN_NAMING_CONVENTION")]
    pub naming_convention: bool,

    /// Only rewrite the output when the types changed
    #[arg(long, env = "ORACLE_TYPEGEN_DIFF_CHECK")]
    pub diff_check: bool,

    /// External formatter, e.g. "prettier --stdin-filepath types.ts"
    #[arg(long, value_name = "CMD", env = "ORACLE_TYPEGEN_FORMATTER")]
    pub formatter_command: Option<String>,

    /// Indentation width for the built-in formatter
    #[arg(long, default_value_t = 4, env = "ORACLE_TYPEGEN_TAB_WIDTH")]
    pub tab_width: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "ORACLE_TYPEGEN_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "ORACLE_TYPEGEN_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn formatter(&self) -> FormatterConfig {
        match &self.formatter_command {
            Some(command) => {
                let mut parts = command.split_whitespace().map(String::from);
                match parts.next() {
                    Some(program) => FormatterConfig::Command {
                        program,
                        args: parts.collect(),
                    },
                    None => self.builtin_formatter(),
                }
            }
            None => self.builtin_formatter(),
        }
    }

    fn builtin_formatter(&self) -> FormatterConfig {
        FormatterConfig::Builtin(FormatterOptions {
            tab_width: self.tab_width,
            ..FormatterOptions::default()
        })
    }

    /// Generator settings equivalent to these CLI flags.
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            resolution_mode: self.resolution_mode.into(),
            use_naming_convention: self.naming_convention,
            diff_check: self.diff_check,
            output_path: Some(self.output.clone()),
            formatter: self.formatter(),
            ..GeneratorConfig::default()
        }
    }
}
