//! Domain primitives: MemberId, RetailerId, TimeMs, Network.

use serde::{Deserialize, Serialize};

/// Sentinel member id used when a conversion cannot be attributed to a click.
pub const UNATTRIBUTED: &str = "unattributed";

/// Time in milliseconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

impl TimeMs {
    /// Create a TimeMs from milliseconds.
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        TimeMs(chrono::Utc::now().timestamp_millis())
    }

    /// Get the underlying milliseconds value.
    pub fn as_ms(&self) -> i64 {
        self.0
    }
}

/// Member identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(pub String);

impl MemberId {
    /// Create a MemberId from a string.
    pub fn new(id: String) -> Self {
        MemberId(id)
    }

    /// The sentinel member for unattributable commissions.
    pub fn unattributed() -> Self {
        MemberId(UNATTRIBUTED.to_string())
    }

    /// Get the member id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unattributed(&self) -> bool {
        self.0 == UNATTRIBUTED
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Retailer identifier (e.g., "amazonBusiness").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RetailerId(pub String);

impl RetailerId {
    /// Create a RetailerId from a string.
    pub fn new(id: String) -> Self {
        RetailerId(id)
    }

    /// Get the retailer id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RetailerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Affiliate network. A closed set: each variant owns one adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Amazon,
    Impact,
    Awin,
}

impl Network {
    /// Canonical lowercase name, as stored in the ledger.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Amazon => "amazon",
            Network::Impact => "impact",
            Network::Awin => "awin",
        }
    }

    /// Parse the canonical name back into a Network.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "amazon" => Some(Network::Amazon),
            "impact" => Some(Network::Impact),
            "awin" => Some(Network::Awin),
            _ => None,
        }
    }

    /// The query parameter each network echoes back on conversion.
    pub fn tracking_param(&self) -> &'static str {
        match self {
            Network::Amazon => "ascsubtag",
            Network::Impact => "subId1",
            Network::Awin => "clickref",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
