//! Per-network payload normalization.
//!
//! Each affiliate network reports conversions in its own shape: different
//! field names for the tracking token, order id, amount, and status, sent as
//! GET query parameters or a POST body. Each network module owns an explicit
//! alias table; normalization funnels everything through one shared core so
//! the skip/error discipline is identical across networks.

pub mod amazon;
pub mod awin;
pub mod impact;

use crate::domain::{money, CommissionIntent, CommissionStatus, Network, TimeMs};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

/// Flat field map assembled from query parameters and/or a request body.
///
/// Keys are lowercased on insert so alias lookup is case-insensitive
/// (vendors disagree on casing as much as on naming).
#[derive(Debug, Clone, Default)]
pub struct RawPayload {
    fields: BTreeMap<String, String>,
}

impl RawPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.fields.insert(key.to_ascii_lowercase(), value.to_string());
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut raw = Self::new();
        for (k, v) in pairs {
            raw.insert(k.as_ref(), v.as_ref());
        }
        raw
    }

    /// Merge the scalar fields of a JSON object. Nested values are ignored;
    /// vendors send flat payloads and anything deeper is not ours to guess.
    pub fn merge_json_object(&mut self, value: &serde_json::Value) -> bool {
        match value.as_object() {
            Some(map) => {
                for (k, v) in map {
                    match v {
                        serde_json::Value::String(s) => self.insert(k, s),
                        serde_json::Value::Number(n) => self.insert(k, &n.to_string()),
                        serde_json::Value::Bool(b) => self.insert(k, &b.to_string()),
                        _ => {}
                    }
                }
                true
            }
            None => false,
        }
    }

    /// First alias with a non-blank value wins.
    pub fn first(&self, aliases: &[&str]) -> Option<&str> {
        aliases
            .iter()
            .filter_map(|a| self.fields.get(*a))
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Render the payload for raw-payload logging on rejection.
    pub fn to_log_string(&self) -> String {
        serde_json::to_string(&self.fields).unwrap_or_else(|_| format!("{:?}", self.fields))
    }
}

/// Vendor contract violation: the adapter cannot recognize the payload at
/// all. Webhook callers log the raw payload and still acknowledge; redelivery
/// of an unparseable payload will not become parseable.
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    #[error("payload has no recognizable {network} fields")]
    UnrecognizedShape { network: Network },
}

/// Outcome of normalizing one vendor payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// Canonical intent, ready for attribution and the ledger.
    Intent(CommissionIntent),
    /// Deliberately dropped before the ledger (non-positive or unparseable
    /// amount). The caller must still acknowledge receipt.
    Skipped { reason: String },
}

/// Field-name alias table for one network. Order matters: earlier aliases
/// are the vendor's primary names.
pub struct AliasTable {
    pub network: Network,
    pub token: &'static [&'static str],
    pub order_id: &'static [&'static str],
    pub amount: &'static [&'static str],
    pub status: &'static [&'static str],
}

/// Normalize a raw payload for the given network.
pub fn normalize(
    network: Network,
    raw: &RawPayload,
    received_at: TimeMs,
) -> Result<Normalized, AdapterError> {
    let table = match network {
        Network::Amazon => &amazon::ALIASES,
        Network::Impact => &impact::ALIASES,
        Network::Awin => &awin::ALIASES,
    };
    normalize_with(table, raw, received_at)
}

pub(crate) fn normalize_with(
    table: &AliasTable,
    raw: &RawPayload,
    received_at: TimeMs,
) -> Result<Normalized, AdapterError> {
    let token = raw.first(table.token);
    let order_id = raw.first(table.order_id);
    let amount = raw.first(table.amount);

    // Nothing recognizable at all is a vendor contract violation, not a skip.
    if token.is_none() && order_id.is_none() && amount.is_none() {
        return Err(AdapterError::UnrecognizedShape {
            network: table.network,
        });
    }

    let cents = match amount {
        None => {
            return Ok(Normalized::Skipped {
                reason: "missing amount".to_string(),
            })
        }
        Some(s) => match money::parse_amount_cents(s) {
            None => {
                return Ok(Normalized::Skipped {
                    reason: format!("unparseable amount: {}", s),
                })
            }
            Some(c) if c <= 0 => {
                return Ok(Normalized::Skipped {
                    reason: format!("non-positive amount: {}", s),
                })
            }
            Some(c) => c,
        },
    };

    let status = match raw.first(table.status) {
        Some(s) => map_status(s).unwrap_or_else(|| {
            warn!(network = %table.network, status = s, "unknown vendor status, treating as pending");
            CommissionStatus::Pending
        }),
        None => CommissionStatus::Pending,
    };

    let external_order_id = match order_id {
        Some(id) => id.to_string(),
        None => {
            // Forfeits idempotency for this callback: a redelivery will get
            // a different synthesized id.
            let synthesized = format!("{}_{}", table.network.as_str(), received_at.as_ms());
            warn!(
                network = %table.network,
                order_id = %synthesized,
                "vendor omitted order id, synthesized one (redelivery will not deduplicate)"
            );
            synthesized
        }
    };

    Ok(Normalized::Intent(CommissionIntent {
        network: table.network,
        external_order_id,
        token: token.unwrap_or("").to_string(),
        gross_amount_cents: cents,
        status,
    }))
}

/// Map vendor status vocabularies onto the canonical three states.
pub fn map_status(raw: &str) -> Option<CommissionStatus> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pending" | "new" | "open" => Some(CommissionStatus::Pending),
        "approved" | "validated" | "confirmed" | "paid" | "payable" | "locked" => {
            Some(CommissionStatus::Approved)
        }
        "declined" | "reversed" | "rejected" | "cancelled" | "canceled" | "returned" | "voided" => {
            Some(CommissionStatus::Declined)
        }
        _ => None,
    }
}
