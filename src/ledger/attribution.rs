//! Token-to-member attribution.

use crate::db::Repository;
use crate::domain::MemberId;
use std::sync::Arc;
use tracing::debug;

/// Resolves a tracking token back to the member who clicked.
///
/// Resolution is always fallible: a conversion can arrive before its click
/// was persisted, with a mangled token, or with none at all. A miss is
/// terminal for the call (no retries) and never an error; the ledger
/// records the commission under the unattributed sentinel instead.
pub struct AttributionResolver {
    repo: Arc<Repository>,
}

impl AttributionResolver {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Resolve a token to a member id, or None on any attribution miss.
    ///
    /// # Errors
    /// Returns an error only when storage is unavailable.
    pub async fn resolve(&self, token: &str) -> Result<Option<MemberId>, sqlx::Error> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }

        match self.repo.find_click_by_token(token).await? {
            Some(click) => Ok(Some(click.member_id)),
            None => {
                debug!(token, "no click recorded for token");
                Ok(None)
            }
        }
    }
}
