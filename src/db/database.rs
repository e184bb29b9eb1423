//! Execution handle: compile, acquire, execute, release.

use crate::db::driver::OracleDriver;
use crate::db::native::NativePool;
use crate::dialect::compiler::QueryCompiler;
use crate::dialect::query::SelectQuery;
use crate::error::DbResult;
use crate::logger::Logger;
use crate::models::{CompiledQuery, QueryResult};
use std::sync::Arc;

pub struct Database<P: NativePool> {
    driver: Arc<OracleDriver<P>>,
    compiler: Arc<dyn QueryCompiler>,
}

impl<P: NativePool> Database<P> {
    pub fn new(driver: Arc<OracleDriver<P>>, compiler: Arc<dyn QueryCompiler>) -> Self {
        Self { driver, compiler }
    }

    pub fn compile(&self, query: &SelectQuery) -> CompiledQuery {
        self.compiler.compile(query)
    }

    pub async fn execute(&self, query: &SelectQuery) -> DbResult<QueryResult> {
        let compiled = self.compile(query);
        self.execute_compiled(&compiled).await
    }

    /// Run one statement on a fresh connection. The connection is released
    /// whether or not the statement succeeds.
    pub async fn execute_compiled(&self, query: &CompiledQuery) -> DbResult<QueryResult> {
        self.driver.init().await?;
        let connection = self.driver.acquire_connection().await?;
        let result = connection.execute_query(query).await;
        self.driver.release_connection(&connection).await;
        result
    }

    pub async fn destroy(&self) {
        self.driver.destroy().await;
    }

    pub fn driver(&self) -> &Arc<OracleDriver<P>> {
        &self.driver
    }

    pub fn log(&self) -> &Logger {
        self.driver.log()
    }
}
