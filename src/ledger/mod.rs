//! Commission ledger: attribution, the idempotent write path, balance
//! aggregation, and batch import.

pub mod attribution;
pub mod earnings;
pub mod import;

use crate::db::Repository;
use crate::domain::{Commission, CommissionIntent, MemberId, TimeMs};
use std::sync::Arc;
use tracing::info;

pub use attribution::AttributionResolver;
pub use earnings::EarningsAggregator;
pub use import::{BatchImporter, ImportRow, ImportSummary};

/// The only write path into the commissions table.
///
/// Commissions represent real money: an intent that reaches this type is
/// always recorded, attributed or not. Deduplication is the repository's
/// atomic conditional write; this layer only fills in the sentinel and logs.
pub struct CommissionLedger {
    repo: Arc<Repository>,
}

impl CommissionLedger {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Record a commission intent under the resolved member, or under the
    /// unattributed sentinel when attribution missed.
    ///
    /// # Errors
    /// Returns an error only when storage is unavailable.
    pub async fn record(
        &self,
        intent: &CommissionIntent,
        resolved: Option<MemberId>,
    ) -> Result<Commission, sqlx::Error> {
        let member = resolved.unwrap_or_else(MemberId::unattributed);
        let commission = self
            .repo
            .upsert_commission(intent, &member, TimeMs::now())
            .await?;

        info!(
            network = %commission.network,
            order_id = %commission.external_order_id,
            member = %commission.member_id,
            status = %commission.status,
            cents = commission.gross_amount_cents,
            "commission recorded"
        );
        Ok(commission)
    }
}
