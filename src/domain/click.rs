//! Click-through record.

use crate::domain::{MemberId, Network, RetailerId, TimeMs};
use serde::{Deserialize, Serialize};

/// One click-through attempt by a member. Immutable once recorded and
/// retained indefinitely, since conversions can arrive months later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Click {
    /// Opaque tracking token embedded in the outbound affiliate URL.
    pub token: String,
    pub member_id: MemberId,
    pub retailer_id: RetailerId,
    pub network: Network,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub created_at_ms: TimeMs,
}

impl Click {
    pub fn new(
        token: String,
        member_id: MemberId,
        retailer_id: RetailerId,
        network: Network,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            token,
            member_id,
            retailer_id,
            network,
            user_agent: user_agent.filter(|s| !s.trim().is_empty()),
            created_at_ms: TimeMs::now(),
        }
    }
}
