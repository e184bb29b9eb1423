//! Shared test doubles: an in-memory native client and a capturing subscriber.

#![allow(dead_code)]

use oracle_dialect::db::{NativePool, NativeResult, NativeSession};
use oracle_dialect::error::{DbError, DbResult};
use oracle_dialect::logger::Logger;
use oracle_dialect::models::{ExecuteOptions, QueryParam, Row};
use serde_json::{Value as JsonValue, json};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Metadata, Subscriber};

/// Catalog contents served by the mock, plus call bookkeeping.
#[derive(Default)]
pub struct MockState {
    pub users: Mutex<Vec<String>>,
    pub tables: Mutex<Vec<(String, String)>>,
    pub views: Mutex<Vec<(String, String)>>,
    pub columns: Mutex<Vec<Row>>,
    pub executed: Mutex<Vec<(String, Vec<QueryParam>, ExecuteOptions)>>,
    pub fail_execute: AtomicBool,
    pub fail_connect: AtomicBool,
    pub fail_close: AtomicBool,
    pub connections: AtomicUsize,
    pub session_closes: AtomicUsize,
    pub commits: AtomicUsize,
    pub rollbacks: AtomicUsize,
    pub pool_closes: AtomicUsize,
    pub connect_gate: Mutex<Option<Arc<ConnectGate>>>,
}

/// Holds `get_connection` open until the test lets it finish.
#[derive(Default)]
pub struct ConnectGate {
    pub entered: Notify,
    pub release: Notify,
}

impl MockState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// One schema `SYS` with `DUAL(DUMMY VARCHAR2 NULL)`.
    pub fn with_dual() -> Arc<Self> {
        let state = Self::new();
        state.add_user("SYS");
        state.add_table("SYS", "DUAL");
        state.add_column("SYS", "DUAL", "DUMMY", "VARCHAR2", true);
        state
    }

    /// Make every following `get_connection` wait on the returned gate.
    pub fn install_gate(&self) -> Arc<ConnectGate> {
        let gate = Arc::new(ConnectGate::default());
        *self.connect_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn add_user(&self, name: &str) {
        self.users.lock().unwrap().push(name.to_string());
    }

    pub fn add_table(&self, owner: &str, name: &str) {
        self.tables
            .lock()
            .unwrap()
            .push((owner.to_string(), name.to_string()));
    }

    pub fn add_view(&self, owner: &str, name: &str) {
        self.views
            .lock()
            .unwrap()
            .push((owner.to_string(), name.to_string()));
    }

    pub fn add_column(
        &self,
        owner: &str,
        table: &str,
        name: &str,
        data_type: &str,
        nullable: bool,
    ) {
        let nullable = if nullable { "Y" } else { "N" };
        self.columns.lock().unwrap().push(row(json!({
            "OWNER": owner,
            "TABLE_NAME": table,
            "COLUMN_NAME": name,
            "DATA_TYPE": data_type,
            "DATA_LENGTH": 1,
            "DATA_PRECISION": null,
            "DATA_SCALE": null,
            "NULLABLE": nullable,
            "DATA_DEFAULT": null,
            "IDENTITY_COLUMN": "NO",
        })));
    }

    pub fn add_identity_column(&self, owner: &str, table: &str, name: &str) {
        self.columns.lock().unwrap().push(row(json!({
            "OWNER": owner,
            "TABLE_NAME": table,
            "COLUMN_NAME": name,
            "DATA_TYPE": "NUMBER",
            "DATA_LENGTH": 22,
            "DATA_PRECISION": 10,
            "DATA_SCALE": 0,
            "NULLABLE": "N",
            "DATA_DEFAULT": "\"SYS\".\"ISEQ$$_1\".nextval",
            "IDENTITY_COLUMN": "YES",
        })));
    }

    pub fn executed(&self) -> Vec<(String, Vec<QueryParam>, ExecuteOptions)> {
        self.executed.lock().unwrap().clone()
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.executed().into_iter().map(|(sql, _, _)| sql).collect()
    }

    fn answer(&self, sql: &str) -> Vec<Row> {
        if sql.contains("from all_users") {
            self.users
                .lock()
                .unwrap()
                .iter()
                .map(|u| row(json!({ "USERNAME": u })))
                .collect()
        } else if sql.contains("from all_tables") {
            self.tables
                .lock()
                .unwrap()
                .iter()
                .map(|(o, t)| row(json!({ "OWNER": o, "TABLE_NAME": t })))
                .collect()
        } else if sql.contains("from all_views") {
            self.views
                .lock()
                .unwrap()
                .iter()
                .map(|(o, v)| row(json!({ "OWNER": o, "VIEW_NAME": v })))
                .collect()
        } else if sql.contains("from all_tab_columns") {
            self.columns.lock().unwrap().clone()
        } else {
            vec![row(json!({ "RESULT": 1 }))]
        }
    }
}

pub fn row(value: JsonValue) -> Row {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

pub struct MockPool {
    pub state: Arc<MockState>,
}

impl MockPool {
    pub fn new(state: &Arc<MockState>) -> Self {
        Self {
            state: Arc::clone(state),
        }
    }
}

impl NativePool for MockPool {
    type Session = MockSession;

    async fn get_connection(&self) -> DbResult<MockSession> {
        if self.state.fail_connect.load(Ordering::SeqCst) {
            return Err(DbError::connection("ORA-12541: TNS:no listener", "Check the listener"));
        }
        let gate = self.state.connect_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.state.connections.fetch_add(1, Ordering::SeqCst);
        Ok(MockSession {
            state: Arc::clone(&self.state),
        })
    }

    async fn close(&self) -> DbResult<()> {
        self.state.pool_closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct MockSession {
    state: Arc<MockState>,
}

impl NativeSession for MockSession {
    async fn execute(
        &self,
        sql: &str,
        params: &[QueryParam],
        options: &ExecuteOptions,
    ) -> DbResult<NativeResult> {
        self.state
            .executed
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec(), options.clone()));
        if self.state.fail_execute.load(Ordering::SeqCst) {
            return Err(DbError::database(
                "ORA-00942: table or view does not exist",
                Some("ORA-00942".to_string()),
            ));
        }
        Ok(NativeResult::from_rows(self.state.answer(sql)))
    }

    async fn commit(&self) -> DbResult<()> {
        self.state.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(&self) -> DbResult<()> {
        self.state.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> DbResult<()> {
        self.state.session_closes.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_close.load(Ordering::SeqCst) {
            return Err(DbError::database("ORA-03113: end-of-file on communication channel", None));
        }
        Ok(())
    }
}

/// Records every event's level and message.
#[derive(Clone, Default)]
pub struct CapturingSubscriber {
    pub events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl CapturingSubscriber {
    pub fn logger(&self) -> Logger {
        Logger::from_subscriber(self.clone())
    }

    pub fn messages(&self) -> Vec<(Level, String)> {
        self.events.lock().unwrap().clone()
    }

    pub fn contains(&self, level: Level, message: &str) -> bool {
        self.messages()
            .iter()
            .any(|(l, m)| *l == level && m == message)
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

impl Subscriber for CapturingSubscriber {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.0));
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}
