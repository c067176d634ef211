//! API request models for payment provider webhooks.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The only event that changes any state.
pub const USER_UPGRADED_EVENT: &str = "user.upgraded";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PolkaWebhook {
    /// Event name, e.g. `user.upgraded`
    pub event: String,
    pub data: PolkaWebhookData,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PolkaWebhookData {
    /// The affected user's id (UUID)
    pub user_id: String,
}
