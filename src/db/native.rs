//! Native Oracle client contract.
//!
//! The dialect never talks to the wire itself. A client library (or a test
//! double) implements [`NativePool`] and [`NativeSession`]; the driver and
//! connection layers are generic over them.

use crate::error::DbResult;
use crate::models::{ExecuteOptions, QueryParam, Row};
use std::future::Future;

/// Raw result of one `execute` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeResult {
    /// Keyed by the column names the server reported
    pub rows: Vec<Row>,
    pub rows_affected: Option<u64>,
}

impl NativeResult {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            rows_affected: None,
        }
    }
}

/// One physical session checked out of a pool.
///
/// `sql` uses Oracle positional binds (`:0`, `:1`, ...), aligned with `params`.
pub trait NativeSession: Send + Sync + 'static {
    fn execute(
        &self,
        sql: &str,
        params: &[QueryParam],
        options: &ExecuteOptions,
    ) -> impl Future<Output = DbResult<NativeResult>> + Send;

    fn commit(&self) -> impl Future<Output = DbResult<()>> + Send;

    fn rollback(&self) -> impl Future<Output = DbResult<()>> + Send;

    /// Return the session to its pool.
    fn close(&self) -> impl Future<Output = DbResult<()>> + Send;
}

pub trait NativePool: Send + Sync + 'static {
    type Session: NativeSession;

    fn get_connection(&self) -> impl Future<Output = DbResult<Self::Session>> + Send;

    fn close(&self) -> impl Future<Output = DbResult<()>> + Send;
}
