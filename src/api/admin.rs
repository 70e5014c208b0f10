use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::api::{auth, AppState};
use crate::domain::{money::format_cents, Commission, Network};
use crate::error::AppError;
use crate::ledger::import::{parse_csv_rows, ImportRow, ImportSummary};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub network: String,
    pub rows: Vec<ImportRow>,
}

/// Bulk commission import: a JSON `{network, rows}` document, or a raw CSV
/// body with the network named in the `network` query parameter.
pub async fn import(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<ImportSummary>, AppError> {
    auth::require_admin(state.auth.as_ref(), &headers)?;

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let (network, rows) = if content_type.starts_with("text/csv") {
        let network = params
            .get("network")
            .map(|s| s.as_str())
            .and_then(Network::parse)
            .ok_or_else(|| {
                AppError::BadRequest("CSV import requires ?network=<name>".to_string())
            })?;
        (network, parse_csv_rows(&body))
    } else {
        let req: ImportRequest = serde_json::from_str(&body)
            .map_err(|e| AppError::BadRequest(format!("invalid import request: {}", e)))?;
        let network = Network::parse(&req.network)
            .ok_or_else(|| AppError::BadRequest(format!("unknown network: {}", req.network)))?;
        (network, req.rows.into_iter().map(Ok).collect())
    };

    let summary = state.importer.run(network, &rows).await;
    Ok(Json(summary))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnattributedResponse {
    pub count: usize,
    pub commissions: Vec<UnattributedDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnattributedDto {
    pub network: String,
    pub external_order_id: String,
    pub token: String,
    pub gross_amount_cents: i64,
    pub amount: String,
    pub status: String,
    pub created_at_ms: i64,
}

#[derive(Debug, Deserialize)]
pub struct UnattributedQuery {
    pub limit: Option<i64>,
}

/// Reconciliation report: commissions parked under the unattributed
/// sentinel, oldest first, so the money stays visible until someone claims it.
pub async fn unattributed(
    Query(params): Query<UnattributedQuery>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UnattributedResponse>, AppError> {
    auth::require_admin(state.auth.as_ref(), &headers)?;

    let limit = params.limit.unwrap_or(100).clamp(1, 1000);
    let rows = state.repo.query_unattributed(limit).await?;

    let commissions: Vec<UnattributedDto> = rows.into_iter().map(to_dto).collect();
    Ok(Json(UnattributedResponse {
        count: commissions.len(),
        commissions,
    }))
}

fn to_dto(c: Commission) -> UnattributedDto {
    UnattributedDto {
        network: c.network.as_str().to_string(),
        external_order_id: c.external_order_id,
        token: c.token,
        gross_amount_cents: c.gross_amount_cents,
        amount: format_cents(c.gross_amount_cents),
        status: c.status.as_str().to_string(),
        created_at_ms: c.created_at_ms.as_ms(),
    }
}
