//! Integration tests for connection bookkeeping and transactions in the driver.

mod common;

use common::{CapturingSubscriber, MockPool, MockState};
use futures_util::future::FutureExt;
use oracle_dialect::config::{PoolOptions, PoolSource, TransactionMode};
use oracle_dialect::db::{Database, OracleDriver};
use oracle_dialect::dialect::OracleQueryCompiler;
use oracle_dialect::logger::Logger;
use oracle_dialect::models::{CompiledQuery, ExecuteOptions};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::Level;

fn driver(state: &Arc<MockState>, mode: TransactionMode, log: Logger) -> OracleDriver<MockPool> {
    OracleDriver::new(
        PoolSource::Pool(Arc::new(MockPool::new(state))),
        ExecuteOptions::default(),
        mode,
        log,
    )
}

#[tokio::test]
async fn test_acquire_before_init_fails() {
    let state = MockState::new();
    let driver = driver(&state, TransactionMode::Native, Logger::noop());
    let err = driver.acquire_connection().await.unwrap_err();
    assert!(err.to_string().contains("Driver not initialized"));
    assert_eq!(state.connections.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_factory_runs_once_with_alias() {
    let state = MockState::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(None::<PoolOptions>));

    let source = {
        let state = Arc::clone(&state);
        let calls = Arc::clone(&calls);
        let seen = Arc::clone(&seen);
        PoolSource::factory(move |options| {
            calls.fetch_add(1, Ordering::SeqCst);
            *seen.lock().unwrap() = Some(options);
            let pool = MockPool::new(&state);
            async move { Ok(pool) }.boxed()
        })
    };
    let driver = OracleDriver::new(
        source,
        ExecuteOptions::default(),
        TransactionMode::Native,
        Logger::noop(),
    );

    driver.init().await.unwrap();
    driver.init().await.unwrap();
    assert!(driver.is_initialized().await);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        seen.lock().unwrap().clone().unwrap().alias.as_deref(),
        Some("kysely")
    );
}

#[tokio::test]
async fn test_acquire_and_release_track_registry() {
    let state = MockState::new();
    let driver = driver(&state, TransactionMode::Native, Logger::noop());
    driver.init().await.unwrap();

    let conn = driver.acquire_connection().await.unwrap();
    assert_eq!(driver.connection_count().await, 1);
    assert!(driver.get_connection(conn.identifier()).await.is_some());
    let listed = driver.list_connections().await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].identifier, conn.identifier());

    driver.release_connection(&conn).await;
    assert_eq!(driver.connection_count().await, 0);
    assert_eq!(state.session_closes.load(Ordering::SeqCst), 1);

    // Second release is a no-op
    driver.release_connection(&conn).await;
    assert_eq!(state.session_closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_release_swallows_close_errors() {
    let state = MockState::new();
    state.fail_close.store(true, Ordering::SeqCst);
    let capture = CapturingSubscriber::default();
    let driver = driver(&state, TransactionMode::Native, capture.logger());
    driver.init().await.unwrap();

    let conn = driver.acquire_connection().await.unwrap();
    driver.release_connection(&conn).await;

    assert_eq!(driver.connection_count().await, 0);
    assert!(capture.contains(Level::ERROR, "Failed to close connection"));
}

#[tokio::test]
async fn test_connect_failure_propagates() {
    let state = MockState::new();
    state.fail_connect.store(true, Ordering::SeqCst);
    let driver = driver(&state, TransactionMode::Native, Logger::noop());
    driver.init().await.unwrap();

    let err = driver.acquire_connection().await.unwrap_err();
    assert!(err.to_string().contains("TNS"));
    assert_eq!(driver.connection_count().await, 0);
}

#[tokio::test]
async fn test_destroy_releases_everything_once() {
    let state = MockState::new();
    let driver = driver(&state, TransactionMode::Native, Logger::noop());
    driver.init().await.unwrap();

    let first = driver.acquire_connection().await.unwrap();
    let _second = driver.acquire_connection().await.unwrap();
    driver.release_connection(&first).await;

    driver.destroy().await;
    driver.destroy().await;

    assert_eq!(driver.connection_count().await, 0);
    assert_eq!(state.session_closes.load(Ordering::SeqCst), 2);
    assert_eq!(state.pool_closes.load(Ordering::SeqCst), 1);
    assert!(!driver.is_initialized().await);
}

#[tokio::test]
async fn test_destroyed_driver_stays_destroyed() {
    let state = MockState::new();
    let driver = driver(&state, TransactionMode::Native, Logger::noop());
    driver.init().await.unwrap();
    driver.destroy().await;

    let err = driver.init().await.unwrap_err();
    assert!(err.to_string().contains("Driver destroyed"));
    let err = driver.acquire_connection().await.unwrap_err();
    assert!(err.to_string().contains("Driver destroyed"));
    assert!(driver.is_destroyed().await);

    driver.destroy().await;
    assert_eq!(state.pool_closes.load(Ordering::SeqCst), 1);
    assert_eq!(state.connections.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_factory_not_rerun_after_destroy() {
    let state = MockState::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let source = {
        let state = Arc::clone(&state);
        let calls = Arc::clone(&calls);
        PoolSource::factory(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            let pool = MockPool::new(&state);
            async move { Ok(pool) }.boxed()
        })
    };
    let driver = Arc::new(OracleDriver::new(
        source,
        ExecuteOptions::default(),
        TransactionMode::Native,
        Logger::noop(),
    ));
    let db = Database::new(Arc::clone(&driver), Arc::new(OracleQueryCompiler));
    let query = CompiledQuery::raw("select 1 from dual");

    db.execute_compiled(&query).await.unwrap();
    db.destroy().await;
    assert!(db.execute_compiled(&query).await.is_err());
    db.destroy().await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(state.pool_closes.load(Ordering::SeqCst), 1);
    assert_eq!(state.connections.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_acquire_racing_destroy_closes_its_session() {
    let state = MockState::new();
    let driver = Arc::new(driver(&state, TransactionMode::Native, Logger::noop()));
    driver.init().await.unwrap();
    let gate = state.install_gate();

    let pending = {
        let driver = Arc::clone(&driver);
        tokio::spawn(async move { driver.acquire_connection().await })
    };
    gate.entered.notified().await;
    driver.destroy().await;
    gate.release.notify_one();

    let err = pending.await.unwrap().unwrap_err();
    assert!(err.to_string().contains("Driver destroyed"));
    assert_eq!(driver.connection_count().await, 0);
    assert_eq!(state.session_closes.load(Ordering::SeqCst), 1);
    assert_eq!(state.pool_closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_native_transactions_delegate_to_session() {
    let state = MockState::new();
    let driver = driver(&state, TransactionMode::Native, Logger::noop());
    driver.init().await.unwrap();
    let conn = driver.acquire_connection().await.unwrap();

    driver.begin_transaction(&conn).await.unwrap();
    driver.commit_transaction(&conn).await.unwrap();
    driver.begin_transaction(&conn).await.unwrap();
    driver.rollback_transaction(&conn).await.unwrap();

    assert_eq!(state.commits.load(Ordering::SeqCst), 1);
    assert_eq!(state.rollbacks.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unsupported_transactions_fail() {
    let state = MockState::new();
    let driver = driver(&state, TransactionMode::Unsupported, Logger::noop());
    driver.init().await.unwrap();
    let conn = driver.acquire_connection().await.unwrap();

    assert!(driver.begin_transaction(&conn).await.unwrap_err().is_not_implemented());
    assert!(driver.commit_transaction(&conn).await.unwrap_err().is_not_implemented());
    assert!(driver.rollback_transaction(&conn).await.unwrap_err().is_not_implemented());
    assert_eq!(state.commits.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_acquire_and_release() {
    let state = MockState::new();
    let driver = Arc::new(driver(&state, TransactionMode::Native, Logger::noop()));
    driver.init().await.unwrap();

    let mut handles = Vec::new();
    for i in 0..64 {
        let driver = Arc::clone(&driver);
        handles.push(tokio::spawn(async move {
            let conn = driver.acquire_connection().await.unwrap();
            if i % 2 == 0 {
                driver.release_connection(&conn).await;
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(driver.connection_count().await, 32);
    driver.destroy().await;
    assert_eq!(state.session_closes.load(Ordering::SeqCst), 64);
}
