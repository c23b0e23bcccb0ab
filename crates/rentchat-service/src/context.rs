//! Request context carrying the authenticated user.

use chrono::{DateTime, Utc};

use rentchat_core::types::UserId;
use rentchat_entity::UserSummary;

/// Who is acting, resolved once per connection or HTTP request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The authenticated user.
    pub user: UserSummary,
    /// When the request (or connection) was accepted.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Create a context for `user`.
    pub fn new(user: UserSummary) -> Self {
        Self {
            user,
            request_time: Utc::now(),
        }
    }

    /// The acting user's id.
    pub fn user_id(&self) -> UserId {
        self.user.id
    }
}
