use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use crate::api::{auth, AppState};
use crate::domain::{money::format_cents, Commission};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionListResponse {
    pub count: usize,
    pub commissions: Vec<CommissionDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionDto {
    pub network: String,
    pub external_order_id: String,
    pub token: String,
    pub gross_amount_cents: i64,
    pub amount: String,
    pub status: String,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// Commission history for the authenticated member, newest first. Declined
/// rows are included; the history shows every ledger entry, not just the
/// ones that count toward the balance.
pub async fn list_commissions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CommissionListResponse>, AppError> {
    let member = auth::require_member(state.auth.as_ref(), &headers)?;

    let rows = state.repo.query_commissions_for_member(&member).await?;
    let commissions: Vec<CommissionDto> = rows.into_iter().map(to_dto).collect();

    Ok(Json(CommissionListResponse {
        count: commissions.len(),
        commissions,
    }))
}

fn to_dto(c: Commission) -> CommissionDto {
    CommissionDto {
        network: c.network.as_str().to_string(),
        external_order_id: c.external_order_id,
        token: c.token,
        gross_amount_cents: c.gross_amount_cents,
        amount: format_cents(c.gross_amount_cents),
        status: c.status.as_str().to_string(),
        created_at_ms: c.created_at_ms.as_ms(),
        updated_at_ms: c.updated_at_ms.as_ms(),
    }
}
