//! Normalized participant pairs and the composite conversation key.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;
use crate::types::id::{UserId, VehicleId};

/// The two participants of a conversation, stored in canonical order.
///
/// `first` is always the smaller identifier, so `new(a, b)` and `new(b, a)`
/// produce equal values and resolve to the same stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantPair {
    first: UserId,
    second: UserId,
}

impl ParticipantPair {
    /// Builds a normalized pair. A user cannot converse with themselves.
    pub fn new(a: UserId, b: UserId) -> AppResult<Self> {
        if a == b {
            return Err(AppError::validation("Cannot send message to yourself"));
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { first, second })
    }

    /// Builds a pair from an arbitrary list of ids, collapsing duplicates.
    ///
    /// Fails unless exactly two distinct users remain.
    pub fn from_ids(ids: impl IntoIterator<Item = UserId>) -> AppResult<Self> {
        let mut unique: Vec<UserId> = ids.into_iter().collect();
        unique.sort();
        unique.dedup();
        match unique.as_slice() {
            [a, b] => Self::new(*a, *b),
            _ => Err(AppError::validation(format!(
                "A conversation needs exactly two distinct participants, got {}",
                unique.len()
            ))),
        }
    }

    /// The smaller participant id.
    pub fn first(&self) -> UserId {
        self.first
    }

    /// The larger participant id.
    pub fn second(&self) -> UserId {
        self.second
    }

    /// Both participants in canonical order.
    pub fn as_array(&self) -> [UserId; 2] {
        [self.first, self.second]
    }

    /// Whether the given user is one of the two participants.
    pub fn contains(&self, user_id: UserId) -> bool {
        self.first == user_id || self.second == user_id
    }

    /// The participant that is not `user_id`, if `user_id` participates.
    pub fn other(&self, user_id: UserId) -> Option<UserId> {
        if self.first == user_id {
            Some(self.second)
        } else if self.second == user_id {
            Some(self.first)
        } else {
            None
        }
    }
}

/// Lookup key of a conversation: the normalized pair plus the vehicle.
///
/// A pair of users may hold one conversation per distinct vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversationKey {
    /// Normalized participants.
    pub participants: ParticipantPair,
    /// Vehicle the thread is scoped to.
    pub vehicle_id: VehicleId,
}

impl ConversationKey {
    /// Builds the key for a message between `a` and `b` about `vehicle_id`.
    pub fn new(a: UserId, b: UserId, vehicle_id: VehicleId) -> AppResult<Self> {
        Ok(Self {
            participants: ParticipantPair::new(a, b)?,
            vehicle_id,
        })
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.participants.first, self.participants.second, self.vehicle_id
        )
    }
}
