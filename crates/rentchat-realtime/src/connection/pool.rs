//! Connection pool: every live connection by session id.

use std::sync::Arc;

use dashmap::DashMap;

use rentchat_core::types::SessionId;

use super::handle::ConnectionHandle;

/// Thread-safe pool of all live connections on this process.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    by_id: DashMap<SessionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle);
    }

    /// Remove a connection.
    pub fn remove(&self, id: &SessionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.remove(id).map(|(_, handle)| handle)
    }

    /// Look up a connection.
    pub fn get(&self, id: &SessionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(id).map(|entry| entry.value().clone())
    }

    /// Every connection except `exclude`.
    pub fn others(&self, exclude: &SessionId) -> Vec<Arc<ConnectionHandle>> {
        self.by_id
            .iter()
            .filter(|entry| entry.key() != exclude)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Every connection.
    pub fn all(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether no connection is open.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
