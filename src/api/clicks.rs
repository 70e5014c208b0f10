use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::{auth, AppState};
use crate::domain::{token, Click, RetailerId};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickRequest {
    pub retailer_id: String,
    pub user_agent: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickResponse {
    pub token: String,
    pub redirect_url: String,
}

/// Issue a tracking token and the tokenized affiliate URL for a retailer.
///
/// The click-log write is best-effort: a storage failure is logged and the
/// member is still redirected. The conversion, if any, will land in the
/// unattributed report.
pub async fn create_click(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ClickRequest>,
) -> Result<Json<ClickResponse>, AppError> {
    let member = auth::require_member(state.auth.as_ref(), &headers)?;

    let retailer = state
        .config
        .retailers
        .get(&req.retailer_id)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown retailer: {}", req.retailer_id)))?;

    let tracking_token = token::generate(&member);
    let click = Click::new(
        tracking_token.clone(),
        member,
        RetailerId::new(req.retailer_id),
        retailer.network,
        req.user_agent,
    );

    if let Err(e) = state.repo.insert_click(&click).await {
        warn!(
            token = %click.token,
            retailer = %click.retailer_id,
            error = %e,
            "click log write failed, redirect proceeds unattributed"
        );
    }

    let separator = if retailer.url.contains('?') { '&' } else { '?' };
    let redirect_url = format!(
        "{}{}{}={}",
        retailer.url,
        separator,
        retailer.network.tracking_param(),
        tracking_token
    );

    Ok(Json(ClickResponse {
        token: tracking_token,
        redirect_url,
    }))
}
