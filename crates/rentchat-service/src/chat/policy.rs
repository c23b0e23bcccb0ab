//! Who may message whom about which vehicle.

use std::sync::Arc;

use tracing::debug;

use rentchat_core::error::AppError;
use rentchat_core::result::AppResult;
use rentchat_core::types::{ConversationKey, UserId, VehicleId};
use rentchat_database::{ConversationStore, VehicleCatalog};
use rentchat_entity::Vehicle;

/// Why a message was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// The owner writes to a prospective renter.
    OwnerToRenter,
    /// A renter writes to the owner.
    RenterToOwner,
    /// Neither is the owner, but the thread already exists.
    ExistingConversation,
}

/// Why a message was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// Sender and receiver are the same user.
    SelfMessage,
    /// The vehicle does not exist.
    VehicleNotFound,
    /// No ownership relation and no prior thread.
    NoSharedContext,
}

impl DenialReason {
    /// Human-readable reason shown to the sender.
    pub fn message(&self) -> &'static str {
        match self {
            Self::SelfMessage => "Cannot send message to yourself",
            Self::VehicleNotFound => "Vehicle not found",
            Self::NoSharedContext => {
                "You can only message the vehicle owner or participants in existing conversations"
            }
        }
    }

    /// Convert into the error reported to the caller.
    pub fn into_error(self) -> AppError {
        match self {
            Self::SelfMessage => AppError::validation(self.message()),
            Self::VehicleNotFound => AppError::not_found(self.message()),
            Self::NoSharedContext => AppError::authorization(self.message()),
        }
    }
}

/// Outcome of [`AuthorizationPolicy::can_message`].
#[derive(Debug, Clone)]
pub enum PolicyDecision {
    /// The message may be sent.
    Allowed {
        /// The resolved vehicle.
        vehicle: Vehicle,
        /// Which rule allowed it.
        grant: Grant,
    },
    /// The message must be rejected.
    Denied(DenialReason),
}

impl PolicyDecision {
    /// The vehicle on success, the mapped error otherwise.
    pub fn into_result(self) -> AppResult<Vehicle> {
        match self {
            Self::Allowed { vehicle, .. } => Ok(vehicle),
            Self::Denied(reason) => Err(reason.into_error()),
        }
    }
}

/// Evaluates the messaging rules in order:
///
/// 1. deny self-messages,
/// 2. deny unknown vehicles,
/// 3. allow owner → renter,
/// 4. allow renter → owner,
/// 5. allow when a conversation already exists for the key,
/// 6. deny otherwise.
#[derive(Debug, Clone)]
pub struct AuthorizationPolicy {
    vehicles: Arc<dyn VehicleCatalog>,
    conversations: Arc<dyn ConversationStore>,
}

impl AuthorizationPolicy {
    /// Create a policy over the vehicle catalog and conversation store.
    pub fn new(
        vehicles: Arc<dyn VehicleCatalog>,
        conversations: Arc<dyn ConversationStore>,
    ) -> Self {
        Self {
            vehicles,
            conversations,
        }
    }

    /// Decide whether `sender` may message `receiver` about `vehicle_id`.
    ///
    /// Store failures are returned as `Err`; a rejection is `Ok(Denied)`.
    pub async fn can_message(
        &self,
        sender: UserId,
        receiver: UserId,
        vehicle_id: VehicleId,
    ) -> AppResult<PolicyDecision> {
        if sender == receiver {
            return Ok(PolicyDecision::Denied(DenialReason::SelfMessage));
        }

        let Some(vehicle) = self.vehicles.find_vehicle(vehicle_id).await? else {
            return Ok(PolicyDecision::Denied(DenialReason::VehicleNotFound));
        };

        if vehicle.is_owned_by(sender) {
            return Ok(PolicyDecision::Allowed {
                vehicle,
                grant: Grant::OwnerToRenter,
            });
        }
        if vehicle.is_owned_by(receiver) {
            return Ok(PolicyDecision::Allowed {
                vehicle,
                grant: Grant::RenterToOwner,
            });
        }

        let key = ConversationKey::new(sender, receiver, vehicle_id)?;
        if self.conversations.find_by_key(&key).await?.is_some() {
            return Ok(PolicyDecision::Allowed {
                vehicle,
                grant: Grant::ExistingConversation,
            });
        }

        debug!(
            sender = %sender,
            receiver = %receiver,
            vehicle_id = %vehicle_id,
            "Message denied: no shared context"
        );
        Ok(PolicyDecision::Denied(DenialReason::NoSharedContext))
    }
}
