//! Member earnings aggregation.

use crate::db::Repository;
use crate::domain::{MemberBalance, MemberId};
use std::sync::Arc;

/// Read path over Commission rows. Balances are always recomputed from the
/// rows themselves; a row that flips from approved to declined disappears
/// from the totals on the next read.
pub struct EarningsAggregator {
    repo: Arc<Repository>,
}

impl EarningsAggregator {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Current pending/approved/total balances for a member.
    ///
    /// # Errors
    /// Returns an error when storage is unavailable; callers must surface
    /// that as retryable rather than reporting zero balances.
    pub async fn stats_for(&self, member_id: &MemberId) -> Result<MemberBalance, sqlx::Error> {
        self.repo.balance_for_member(member_id).await
    }
}
