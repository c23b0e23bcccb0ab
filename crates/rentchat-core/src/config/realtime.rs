//! Live connection (WebSocket) configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the chat event protocol over live connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Window within which a new connection must authenticate.
    #[serde(default = "default_auth_timeout")]
    pub auth_timeout_seconds: u64,
    /// Per-connection outbound event queue size.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Largest accepted inbound frame in bytes.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

impl RealtimeConfig {
    /// Authentication window as a `Duration`.
    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_seconds)
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            auth_timeout_seconds: default_auth_timeout(),
            channel_buffer_size: default_channel_buffer(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

fn default_auth_timeout() -> u64 {
    10
}

fn default_channel_buffer() -> usize {
    256
}

fn default_max_message_bytes() -> usize {
    65_536
}
