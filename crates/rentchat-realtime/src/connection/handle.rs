//! Individual live connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::warn;

use rentchat_core::types::{SessionId, UserId};
use rentchat_entity::UserSummary;

use crate::message::types::OutboundEvent;

/// Outcome of pushing an event onto a connection's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Queued for the socket writer.
    Queued,
    /// Queue full; the event was dropped.
    Dropped,
    /// The connection is gone.
    Closed,
}

/// A handle to one authenticated live connection.
///
/// Owns the sending half of the bounded outbound queue. The transport task
/// drains the receiving half into the socket.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Transport session id.
    pub id: SessionId,
    /// The authenticated user.
    pub user: UserSummary,
    /// Sender for outbound events.
    sender: mpsc::Sender<OutboundEvent>,
    /// When the connection was accepted.
    pub connected_at: DateTime<Utc>,
    /// Whether the connection is still alive.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a handle for `user` writing into `sender`.
    pub fn new(user: UserSummary, sender: mpsc::Sender<OutboundEvent>) -> Self {
        Self {
            id: SessionId::new(),
            user,
            sender,
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// The connected user's id.
    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    /// Queue an event without waiting. A full queue drops the event.
    pub fn send(&self, event: OutboundEvent) -> SendOutcome {
        if !self.is_alive() {
            return SendOutcome::Closed;
        }
        match self.sender.try_send(event) {
            Ok(()) => SendOutcome::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %self.id, user_id = %self.user.id, "Send buffer full, dropping event");
                SendOutcome::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                SendOutcome::Closed
            }
        }
    }

    /// Check if the connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection as dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
