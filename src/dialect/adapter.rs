//! Dialect adapter: capability flags and migration-lock hooks.

use crate::error::{DbError, DbResult};

/// What the dialect can do, as seen by the query builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterCapabilities {
    /// `RETURNING` on insert/update/delete
    pub supports_returning: bool,
    /// DDL inside explicit transactions
    pub supports_transactional_ddl: bool,
}

impl AdapterCapabilities {
    pub const ORACLE: Self = Self {
        supports_returning: false,
        supports_transactional_ddl: false,
    };
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OracleAdapter;

impl OracleAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::ORACLE
    }

    pub fn supports_returning(&self) -> bool {
        self.capabilities().supports_returning
    }

    pub fn supports_transactional_ddl(&self) -> bool {
        self.capabilities().supports_transactional_ddl
    }

    /// Oracle offers no migration lock; always fails.
    pub async fn acquire_migration_lock(&self) -> DbResult<()> {
        Err(DbError::not_implemented("acquireMigrationLock"))
    }

    /// Oracle offers no migration lock; always fails.
    pub async fn release_migration_lock(&self) -> DbResult<()> {
        Err(DbError::not_implemented("releaseMigrationLock"))
    }
}
