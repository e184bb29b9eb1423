//! A single checked-out Oracle session.
//!
//! [`OracleConnection`] rewrites generic `$N` placeholders into Oracle's
//! zero-based `:N` binds before every execution and normalizes result rows to
//! lower-case column keys.

use crate::db::native::NativeSession;
use crate::error::{DbError, DbResult};
use crate::logger::Logger;
use crate::models::{CompiledQuery, ExecuteOptions, FormattedQuery, QueryResult, Row};
use futures_util::stream::BoxStream;
use std::time::Instant;
use tracing::{debug, error, trace};
use uuid::Uuid;

pub struct OracleConnection<S> {
    identifier: String,
    session: S,
    execute_options: ExecuteOptions,
    log: Logger,
}

impl<S> OracleConnection<S> {
    /// Wrap a native session and assign it a fresh identifier.
    pub fn new(session: S, log: Logger, execute_options: ExecuteOptions) -> Self {
        Self {
            identifier: Uuid::new_v4().to_string(),
            session,
            execute_options,
            log,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn session(&self) -> &S {
        &self.session
    }
}

impl<S: NativeSession> OracleConnection<S> {
    /// Execute a compiled query and return its rows keyed by lower-cased column name.
    pub async fn execute_query(&self, query: &CompiledQuery) -> DbResult<QueryResult> {
        let FormattedQuery { sql, bind_params } = self.format_query(query);
        let start = Instant::now();
        self.log.scope(|| {
            debug!(
                id = %self.identifier,
                sql = %self.format_query_for_logging(query),
                "Executing query"
            )
        });

        let result = self
            .session
            .execute(&sql, &bind_params, &self.execute_options)
            .await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(native) => {
                self.log.scope(|| {
                    trace!(
                        id = %self.identifier,
                        duration_ms = duration_ms,
                        row_count = native.rows.len(),
                        "Execution complete"
                    )
                });
                Ok(QueryResult {
                    rows: native.rows.into_iter().map(lowercase_keys).collect(),
                    num_affected_rows: native.rows_affected,
                })
            }
            Err(err) => {
                self.log.scope(|| {
                    error!(
                        id = %self.identifier,
                        duration_ms = duration_ms,
                        error = %err,
                        "Query execution failed"
                    )
                });
                Err(err)
            }
        }
    }

    /// Rewrite `$N` placeholders into Oracle binds `:{N-1}`.
    pub fn format_query(&self, query: &CompiledQuery) -> FormattedQuery {
        format_query(query)
    }

    /// Inline parameter literals for log output. Never execute the result.
    pub fn format_query_for_logging(&self, query: &CompiledQuery) -> String {
        format_query_for_logging(query)
    }

    /// Streaming is not supported by this dialect.
    pub fn stream_query(
        &self,
        _query: &CompiledQuery,
    ) -> DbResult<BoxStream<'static, DbResult<QueryResult>>> {
        Err(DbError::not_implemented("streamQuery"))
    }
}

impl<S> std::fmt::Debug for OracleConnection<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleConnection")
            .field("identifier", &self.identifier)
            .field("execute_options", &self.execute_options)
            .finish_non_exhaustive()
    }
}

/// Rewrite `$N` placeholders into Oracle binds `:{N-1}`.
///
/// `$0` and a `$` without digits are left as they are.
pub fn format_query(query: &CompiledQuery) -> FormattedQuery {
    let sql = replace_placeholders(&query.sql, |position| {
        position.checked_sub(1).map(|index| format!(":{}", index))
    });
    FormattedQuery {
        sql,
        bind_params: query.parameters.clone(),
    }
}

/// Substitute each `$N` with the literal of parameter `N` (1-based).
pub fn format_query_for_logging(query: &CompiledQuery) -> String {
    replace_placeholders(&query.sql, |position| {
        let index = position.checked_sub(1)?;
        Some(
            query
                .parameters
                .get(index)
                .map(|param| param.to_log_literal())
                .unwrap_or_else(|| "null".to_string()),
        )
    })
}

/// Scan `sql` for `$` followed by decimal digits and splice in `replace(N)`.
/// A `None` from `replace` keeps the original text.
fn replace_placeholders(sql: &str, mut replace: impl FnMut(usize) -> Option<String>) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let digits_start = start + 1;
        let mut digits_end = digits_start;
        while let Some(&(i, d)) = chars.peek() {
            if !d.is_ascii_digit() {
                break;
            }
            digits_end = i + d.len_utf8();
            chars.next();
        }
        let original = &sql[start..digits_end];
        let replacement = sql[digits_start..digits_end]
            .parse::<usize>()
            .ok()
            .and_then(&mut replace);
        match replacement {
            Some(text) => out.push_str(&text),
            None => out.push_str(original),
        }
    }

    out
}

fn lowercase_keys(row: Row) -> Row {
    row.into_iter()
        .map(|(key, value)| (key.to_lowercase(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueryParam;

    #[test]
    fn test_format_query_shifts_to_zero_based_binds() {
        let query = CompiledQuery::new("select $1 from dual", vec!["id".into()]);
        let formatted = format_query(&query);
        assert_eq!(formatted.sql, "select :0 from dual");
        assert_eq!(formatted.bind_params, vec![QueryParam::from("id")]);
    }

    #[test]
    fn test_format_query_handles_multi_digit_positions() {
        let params: Vec<QueryParam> = (1..=12).map(QueryParam::Int).collect();
        let query = CompiledQuery::new(
            "select * from t where a = $10 and b in ($11, $12)",
            params.clone(),
        );
        let formatted = format_query(&query);
        assert_eq!(formatted.sql, "select * from t where a = :9 and b in (:10, :11)");
        assert_eq!(formatted.bind_params, params);
    }

    #[test]
    fn test_format_query_leaves_non_placeholders() {
        let query = CompiledQuery::raw("select '$' || v$session.sid, $0 from v$session");
        assert_eq!(format_query(&query).sql, query.sql);
    }

    #[test]
    fn test_format_query_for_logging_inlines_literals() {
        let query = CompiledQuery::new("select $1 from dual", vec!["id".into()]);
        assert_eq!(format_query_for_logging(&query), "select 'id' from dual");

        let query = CompiledQuery::new(
            "select * from t where a = $1 and b = $2 and c = $3",
            vec![QueryParam::Int(7), QueryParam::Null],
        );
        assert_eq!(
            format_query_for_logging(&query),
            "select * from t where a = 7 and b = null and c = null"
        );
    }

    #[test]
    fn test_lowercase_keys() {
        let mut row = Row::new();
        row.insert("TABLE_NAME".to_string(), "DUAL".into());
        let row = lowercase_keys(row);
        assert_eq!(row.get("table_name"), Some(&"DUAL".into()));
        assert!(row.get("TABLE_NAME").is_none());
    }
}
