//! Registry of connections the driver has handed out and not yet released.
//!
//! The driver inserts every acquired connection here and removes it on
//! release, which makes double release detectable and lets `destroy` close
//! whatever callers forgot.

use crate::db::connection::OracleConnection;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

struct ActiveConnection<S> {
    connection: Arc<OracleConnection<S>>,
    acquired_at: Instant,
}

/// Metadata about a checked-out connection (for listing without taking it).
#[derive(Debug, Clone)]
pub struct ConnectionMetadata {
    pub identifier: String,
    /// When the connection was acquired (absolute time)
    pub acquired_at: DateTime<Utc>,
    /// Seconds the connection has been held
    pub held_secs: u64,
}

pub struct ConnectionRegistry<S> {
    connections: RwLock<HashMap<String, ActiveConnection<S>>>,
    /// Registry creation time for converting Instant to DateTime
    start_instant: Instant,
    start_datetime: DateTime<Utc>,
}

impl<S> ConnectionRegistry<S> {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            start_instant: Instant::now(),
            start_datetime: Utc::now(),
        }
    }

    /// Track a connection under its identifier.
    pub async fn insert(&self, connection: Arc<OracleConnection<S>>) {
        let identifier = connection.identifier().to_string();
        let entry = ActiveConnection {
            connection,
            acquired_at: Instant::now(),
        };
        self.connections.write().await.insert(identifier, entry);
    }

    /// Stop tracking a connection. Returns `None` if it was already released.
    pub async fn remove(&self, identifier: &str) -> Option<Arc<OracleConnection<S>>> {
        self.connections
            .write()
            .await
            .remove(identifier)
            .map(|entry| entry.connection)
    }

    pub async fn get(&self, identifier: &str) -> Option<Arc<OracleConnection<S>>> {
        self.connections
            .read()
            .await
            .get(identifier)
            .map(|entry| Arc::clone(&entry.connection))
    }

    /// Remove and return every tracked connection.
    pub async fn drain(&self) -> Vec<Arc<OracleConnection<S>>> {
        self.connections
            .write()
            .await
            .drain()
            .map(|(_, entry)| entry.connection)
            .collect()
    }

    pub async fn list_all(&self) -> Vec<ConnectionMetadata> {
        let connections = self.connections.read().await;
        let mut list: Vec<ConnectionMetadata> = connections
            .iter()
            .map(|(id, entry)| {
                let offset_from_start = entry.acquired_at.duration_since(self.start_instant);
                ConnectionMetadata {
                    identifier: id.clone(),
                    acquired_at: self.start_datetime + offset_from_start,
                    held_secs: entry.acquired_at.elapsed().as_secs(),
                }
            })
            .collect();
        list.sort_by(|a, b| a.acquired_at.cmp(&b.acquired_at));
        list
    }

    pub async fn count(&self) -> usize {
        self.connections.read().await.len()
    }
}

impl<S> Default for ConnectionRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
