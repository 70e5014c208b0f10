use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::adapters::{self, Normalized, RawPayload};
use crate::api::AppState;
use crate::domain::{Network, TimeMs};
use crate::error::AppError;

/// Acknowledgement returned to the vendor. Networks retry on non-2xx, so a
/// parsed-then-skipped payload and even an unparseable one are acknowledged;
/// the detail field carries the reason for observability.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    pub received: bool,
    pub recorded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl WebhookAck {
    fn recorded() -> Self {
        Self {
            received: true,
            recorded: true,
            detail: None,
        }
    }

    fn skipped(detail: String) -> Self {
        Self {
            received: true,
            recorded: false,
            detail: Some(detail),
        }
    }
}

/// Conversion callback intake, one route per network, GET or POST.
///
/// Query parameters and the body (JSON or form-encoded) merge into one flat
/// field map before adapter normalization; vendors disagree on where the
/// fields go. Only storage failure escapes as a non-2xx response.
pub async fn receive(
    Path(network): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookAck>, AppError> {
    let network = Network::parse(&network)
        .ok_or_else(|| AppError::NotFound(format!("unknown network: {}", network)))?;

    let mut raw = RawPayload::from_pairs(params.iter());
    if let Err(reason) = merge_body(&mut raw, &headers, &body) {
        warn!(network = %network, body = %body, "unparseable webhook body");
        return Ok(Json(WebhookAck::skipped(reason)));
    }

    match adapters::normalize(network, &raw, TimeMs::now()) {
        Ok(Normalized::Intent(intent)) => {
            let resolved = state.resolver.resolve(&intent.token).await?;
            state.ledger.record(&intent, resolved).await?;
            Ok(Json(WebhookAck::recorded()))
        }
        Ok(Normalized::Skipped { reason }) => {
            info!(network = %network, reason = %reason, "webhook payload skipped");
            Ok(Json(WebhookAck::skipped(reason)))
        }
        Err(e) => {
            // Redelivery of an unparseable payload will not become parseable,
            // so acknowledge anyway and keep the raw payload in the log.
            warn!(
                network = %network,
                payload = %raw.to_log_string(),
                error = %e,
                "vendor payload rejected"
            );
            Ok(Json(WebhookAck::skipped(e.to_string())))
        }
    }
}

/// Merge a request body into the field map. JSON objects and form encodings
/// are accepted; an empty body is fine (GET callbacks carry everything in
/// the query string).
fn merge_body(raw: &mut RawPayload, headers: &HeaderMap, body: &str) -> Result<(), String> {
    if body.trim().is_empty() {
        return Ok(());
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with("application/json") {
        return merge_json(raw, body);
    }
    if content_type.starts_with("application/x-www-form-urlencoded") {
        return merge_form(raw, body);
    }

    // No usable content type: try JSON first, then form.
    merge_json(raw, body).or_else(|_| merge_form(raw, body))
}

fn merge_json(raw: &mut RawPayload, body: &str) -> Result<(), String> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| format!("invalid JSON body: {}", e))?;
    if raw.merge_json_object(&value) {
        Ok(())
    } else {
        Err("JSON body is not an object".to_string())
    }
}

fn merge_form(raw: &mut RawPayload, body: &str) -> Result<(), String> {
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(body).map_err(|e| format!("invalid form body: {}", e))?;
    for (k, v) in pairs {
        raw.insert(&k, &v);
    }
    Ok(())
}
