//! Commission ledger types.

use crate::domain::{MemberId, Network, TimeMs};
use serde::{Deserialize, Serialize};

/// Canonical three-state commission status. Vendor vocabularies
/// ("validated", "reversed", ...) are mapped onto this by the adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommissionStatus {
    Pending,
    Approved,
    Declined,
}

impl CommissionStatus {
    /// Canonical lowercase name, as stored in the ledger.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommissionStatus::Pending => "pending",
            CommissionStatus::Approved => "approved",
            CommissionStatus::Declined => "declined",
        }
    }

    /// Parse the canonical name back into a status.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(CommissionStatus::Pending),
            "approved" => Some(CommissionStatus::Approved),
            "declined" => Some(CommissionStatus::Declined),
            _ => None,
        }
    }
}

impl std::fmt::Display for CommissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Network-agnostic representation of a reported conversion, produced by a
/// network adapter and consumed by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionIntent {
    pub network: Network,
    /// Unique per network; synthesized from the receive timestamp when the
    /// vendor omits one.
    pub external_order_id: String,
    /// Tracking token as reported by the vendor; may be empty.
    pub token: String,
    pub gross_amount_cents: i64,
    pub status: CommissionStatus,
}

/// One ledger row per (network, external_order_id) pair. Rows are upserted,
/// never duplicated and never deleted; a reversal is a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commission {
    pub network: Network,
    pub external_order_id: String,
    pub member_id: MemberId,
    pub token: String,
    pub gross_amount_cents: i64,
    pub status: CommissionStatus,
    pub created_at_ms: TimeMs,
    pub updated_at_ms: TimeMs,
}

/// Aggregated per-member view, always re-derivable from Commission rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemberBalance {
    pub pending_cents: i64,
    pub approved_cents: i64,
    pub total_cents: i64,
}
