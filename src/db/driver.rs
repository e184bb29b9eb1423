//! Oracle driver: owns the native pool and every connection acquired from it.

use crate::config::{DEFAULT_POOL_ALIAS, PoolOptions, PoolSource, TransactionMode};
use crate::db::connection::OracleConnection;
use crate::db::native::{NativePool, NativeSession};
use crate::db::registry::{ConnectionMetadata, ConnectionRegistry};
use crate::error::{DbError, DbResult};
use crate::logger::Logger;
use crate::models::ExecuteOptions;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

type Session<P> = <P as NativePool>::Session;

/// Lifecycle of the native pool. `Destroyed` is terminal.
enum PoolState<P> {
    Uninitialized,
    Ready(Arc<P>),
    Destroyed,
}

pub struct OracleDriver<P: NativePool> {
    pool_source: PoolSource<P>,
    pool: RwLock<PoolState<P>>,
    registry: ConnectionRegistry<Session<P>>,
    execute_options: ExecuteOptions,
    transaction_mode: TransactionMode,
    log: Logger,
}

impl<P: NativePool> OracleDriver<P> {
    pub fn new(
        pool_source: PoolSource<P>,
        execute_options: ExecuteOptions,
        transaction_mode: TransactionMode,
        log: Logger,
    ) -> Self {
        Self {
            pool_source,
            pool: RwLock::new(PoolState::Uninitialized),
            registry: ConnectionRegistry::new(),
            execute_options,
            transaction_mode,
            log,
        }
    }

    /// Resolve the native pool. Calling it again is a no-op; calling it after
    /// [`destroy`](Self::destroy) fails.
    pub async fn init(&self) -> DbResult<()> {
        let mut slot = self.pool.write().await;
        match *slot {
            PoolState::Ready(_) => return Ok(()),
            PoolState::Destroyed => return Err(destroyed_error()),
            PoolState::Uninitialized => {}
        }

        let pool = match &self.pool_source {
            PoolSource::Pool(pool) => Arc::clone(pool),
            PoolSource::Factory(factory) => {
                let options = PoolOptions {
                    alias: Some(DEFAULT_POOL_ALIAS.to_string()),
                };
                Arc::new(factory(options).await?)
            }
        };
        *slot = PoolState::Ready(pool);

        self.log.scope(|| debug!("Driver initialized"));
        Ok(())
    }

    /// Check out a session and track it until it is released.
    pub async fn acquire_connection(&self) -> DbResult<Arc<OracleConnection<Session<P>>>> {
        let pool = match &*self.pool.read().await {
            PoolState::Ready(pool) => Arc::clone(pool),
            PoolState::Uninitialized => {
                return Err(DbError::connection(
                    "Driver not initialized",
                    "Call init() before acquiring connections",
                ));
            }
            PoolState::Destroyed => return Err(destroyed_error()),
        };

        let session = pool.get_connection().await?;
        let connection = Arc::new(OracleConnection::new(
            session,
            self.log.clone(),
            self.execute_options.clone(),
        ));
        self.registry.insert(Arc::clone(&connection)).await;

        // destroy() may have drained the registry while the session was opening
        if matches!(*self.pool.read().await, PoolState::Destroyed) {
            if self.registry.remove(connection.identifier()).await.is_some() {
                self.close_session(&connection).await;
            }
            return Err(destroyed_error());
        }

        self.log.scope(|| debug!(id = %connection.identifier(), "Connection acquired"));
        Ok(connection)
    }

    pub async fn begin_transaction(
        &self,
        connection: &OracleConnection<Session<P>>,
    ) -> DbResult<()> {
        self.ensure_transactions("beginTransaction")?;
        self.log.scope(|| debug!(id = %connection.identifier(), "Transaction started"));
        Ok(())
    }

    pub async fn commit_transaction(
        &self,
        connection: &OracleConnection<Session<P>>,
    ) -> DbResult<()> {
        self.ensure_transactions("commitTransaction")?;
        connection.session().commit().await?;
        self.log.scope(|| debug!(id = %connection.identifier(), "Transaction committed"));
        Ok(())
    }

    pub async fn rollback_transaction(
        &self,
        connection: &OracleConnection<Session<P>>,
    ) -> DbResult<()> {
        self.ensure_transactions("rollbackTransaction")?;
        connection.session().rollback().await?;
        self.log.scope(|| debug!(id = %connection.identifier(), "Transaction rolled back"));
        Ok(())
    }

    fn ensure_transactions(&self, operation: &str) -> DbResult<()> {
        match self.transaction_mode {
            TransactionMode::Native => Ok(()),
            TransactionMode::Unsupported => Err(DbError::not_implemented(operation)),
        }
    }

    /// Stop tracking a connection and close its session.
    ///
    /// Releasing the same connection twice closes it once. Close failures are
    /// logged, not returned.
    pub async fn release_connection(&self, connection: &OracleConnection<Session<P>>) {
        let identifier = connection.identifier();
        if self.registry.remove(identifier).await.is_none() {
            self.log.scope(|| debug!(id = %identifier, "Connection already released"));
            return;
        }
        self.close_session(connection).await;
    }

    async fn close_session(&self, connection: &OracleConnection<Session<P>>) {
        let identifier = connection.identifier();
        match connection.session().close().await {
            Ok(()) => self.log.scope(|| debug!(id = %identifier, "Connection released")),
            Err(e) => self.log.scope(|| {
                error!(id = %identifier, error = %e, "Failed to close connection")
            }),
        }
    }

    /// Release every outstanding connection, then close the pool.
    ///
    /// The driver cannot be initialized again afterwards. Repeated calls do
    /// nothing.
    pub async fn destroy(&self) {
        let previous = std::mem::replace(&mut *self.pool.write().await, PoolState::Destroyed);

        let outstanding = self.registry.drain().await;
        for connection in &outstanding {
            self.close_session(connection).await;
        }

        if let PoolState::Ready(pool) = previous {
            match pool.close().await {
                Ok(()) => self
                    .log
                    .scope(|| info!(released = outstanding.len(), "Driver destroyed")),
                Err(e) => self.log.scope(|| error!(error = %e, "Failed to close pool")),
            }
        }
    }

    pub async fn get_connection(
        &self,
        identifier: &str,
    ) -> Option<Arc<OracleConnection<Session<P>>>> {
        self.registry.get(identifier).await
    }

    pub async fn connection_count(&self) -> usize {
        self.registry.count().await
    }

    pub async fn list_connections(&self) -> Vec<ConnectionMetadata> {
        self.registry.list_all().await
    }

    pub async fn is_initialized(&self) -> bool {
        matches!(*self.pool.read().await, PoolState::Ready(_))
    }

    pub async fn is_destroyed(&self) -> bool {
        matches!(*self.pool.read().await, PoolState::Destroyed)
    }

    pub fn log(&self) -> &Logger {
        &self.log
    }
}

impl<P: NativePool> std::fmt::Debug for OracleDriver<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleDriver")
            .field("pool_source", &self.pool_source)
            .field("transaction_mode", &self.transaction_mode)
            .finish_non_exhaustive()
    }
}

fn destroyed_error() -> DbError {
    DbError::connection(
        "Driver destroyed",
        "Create a new dialect instead of reusing a destroyed one",
    )
}
