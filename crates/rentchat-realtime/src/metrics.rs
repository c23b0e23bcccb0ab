//! Realtime engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    connections_total: AtomicU64,
    connections_active: AtomicU64,
    connections_refused: AtomicU64,
    intents_received: AtomicU64,
    events_delivered: AtomicU64,
    events_dropped: AtomicU64,
    errors_emitted: AtomicU64,
}

impl RealtimeMetrics {
    /// Create zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// A connection authenticated.
    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// A connection failed authentication and never became active.
    pub fn connection_refused(&self) {
        self.connections_refused.fetch_add(1, Ordering::Relaxed);
    }

    /// A connection went away.
    pub fn connection_closed(&self) {
        let _ = self
            .connections_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// A text frame arrived.
    pub fn intent_received(&self) {
        self.intents_received.fetch_add(1, Ordering::Relaxed);
    }

    /// An event reached a connection queue.
    pub fn event_delivered(&self) {
        self.events_delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// An event was dropped on a full or closed queue.
    pub fn event_dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// An `error` event was emitted.
    pub fn error_emitted(&self) {
        self.errors_emitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            connections_refused: self.connections_refused.load(Ordering::Relaxed),
            intents_received: self.intents_received.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            errors_emitted: self.errors_emitted.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections ever authenticated.
    pub connections_total: u64,
    /// Connections currently open.
    pub connections_active: u64,
    /// Connections refused at authentication.
    pub connections_refused: u64,
    /// Inbound frames processed.
    pub intents_received: u64,
    /// Events queued to connections.
    pub events_delivered: u64,
    /// Events lost to full or closed queues.
    pub events_dropped: u64,
    /// Error events emitted.
    pub errors_emitted: u64,
}
