//! The Oracle dialect: a factory for the driver, query compiler, adapter and
//! introspector, all sharing one configuration.

pub mod adapter;
pub mod compiler;
pub mod query;

pub use adapter::{AdapterCapabilities, OracleAdapter};
pub use compiler::{DefaultQueryCompiler, OracleQueryCompiler, QueryCompiler};
pub use query::{Expr, SelectQuery};

use crate::config::DialectConfig;
use crate::db::{Database, NativePool, OracleDriver, OracleIntrospector};
use crate::logger::Logger;
use std::sync::Arc;

pub struct OracleDialect<P> {
    config: DialectConfig<P>,
}

impl<P: NativePool> OracleDialect<P> {
    pub fn new(config: DialectConfig<P>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DialectConfig<P> {
        &self.config
    }

    pub fn logger(&self) -> &Logger {
        &self.config.logger
    }

    pub fn create_driver(&self) -> OracleDriver<P> {
        OracleDriver::new(
            self.config.pool.clone(),
            self.config.execute_options.clone(),
            self.config.transaction_mode,
            self.config.logger.clone(),
        )
    }

    pub fn create_adapter(&self) -> OracleAdapter {
        OracleAdapter::new()
    }

    pub fn create_query_compiler(&self) -> OracleQueryCompiler {
        OracleQueryCompiler
    }

    /// A fresh driver and compiler behind one execution handle.
    pub fn create_database(&self) -> Arc<Database<P>> {
        Arc::new(Database::new(
            Arc::new(self.create_driver()),
            Arc::new(self.create_query_compiler()),
        ))
    }

    /// Introspector over `db`, with allow-lists from the generator settings
    /// when present.
    pub fn create_introspector(&self, db: Arc<Database<P>>) -> OracleIntrospector<P> {
        match &self.config.generator {
            Some(generator) => OracleIntrospector::from_config(db, generator),
            None => OracleIntrospector::new(db),
        }
    }
}
