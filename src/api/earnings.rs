use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use crate::api::{auth, AppState};
use crate::domain::money::format_cents;
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsResponse {
    pub member_id: String,
    pub pending_cents: i64,
    pub approved_cents: i64,
    pub total_cents: i64,
    pub pending: String,
    pub approved: String,
    pub total: String,
}

/// Current balances for the authenticated member.
///
/// A storage failure surfaces as a retryable 500, never as silent zeros.
pub async fn get_earnings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<EarningsResponse>, AppError> {
    let member = auth::require_member(state.auth.as_ref(), &headers)?;

    let balance = state.aggregator.stats_for(&member).await?;

    Ok(Json(EarningsResponse {
        member_id: member.as_str().to_string(),
        pending_cents: balance.pending_cents,
        approved_cents: balance.approved_cents,
        total_cents: balance.total_cents,
        pending: format_cents(balance.pending_cents),
        approved: format_cents(balance.approved_cents),
        total: format_cents(balance.total_cents),
    }))
}
