//! Connection lifecycle states.

use std::fmt;

/// `Connecting → Authenticated → Active → Disconnected`.
///
/// A connection that fails authentication goes straight to `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Credential not yet checked.
    Connecting,
    /// Credential accepted, presence not yet registered.
    Authenticated,
    /// Registered and processing intents.
    Active,
    /// Terminal.
    Disconnected,
}

impl ConnectionState {
    /// Whether moving to `next` is a legal transition.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Connecting, Self::Authenticated)
                | (Self::Authenticated, Self::Active)
                | (Self::Connecting | Self::Authenticated | Self::Active, Self::Disconnected)
        )
    }

    /// Only active connections process intents.
    pub fn accepts_intents(self) -> bool {
        self == Self::Active
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connecting => "connecting",
            Self::Authenticated => "authenticated",
            Self::Active => "active",
            Self::Disconnected => "disconnected",
        };
        f.write_str(name)
    }
}
