//! Batch commission import.
//!
//! Admin-supplied conversion reports arrive as an array of rows (JSON) or a
//! raw CSV body. Each row is mapped onto the owning network's field names
//! and pushed through the same adapter normalization and ledger upsert as the
//! live webhook path, so re-importing a report never double-counts: the
//! (network, order id) key deduplicates exactly as it does for webhooks.

use crate::adapters::{self, Normalized, RawPayload};
use crate::domain::{Network, TimeMs};
use crate::ledger::{AttributionResolver, CommissionLedger};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Per-row error messages reported back to the admin are capped; the counts
/// are always complete.
pub const MAX_REPORTED_ERRORS: usize = 20;

/// One import row as supplied by the admin report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    #[serde(default)]
    pub tracking_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Outcome of one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

/// Parse a CSV body (with a header row) into per-row results.
///
/// A record that fails to read or deserialize yields an `Err` entry in
/// place, never aborting the records around it; the importer folds those
/// entries into the summary as skipped rows.
pub fn parse_csv_rows(body: &str) -> Vec<Result<ImportRow, String>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    reader
        .deserialize()
        .map(|record| record.map_err(|e| format!("unreadable row: {}", e)))
        .collect()
}

/// Runs import rows through adapter normalization, attribution, and the
/// ledger, independently per row. One bad or slow row never aborts the rest.
pub struct BatchImporter {
    resolver: Arc<AttributionResolver>,
    ledger: Arc<CommissionLedger>,
}

impl BatchImporter {
    pub fn new(resolver: Arc<AttributionResolver>, ledger: Arc<CommissionLedger>) -> Self {
        Self { resolver, ledger }
    }

    /// Process a batch of rows for one network. Re-runnable: rows already
    /// ingested merge into their existing ledger entries.
    pub async fn run(
        &self,
        network: Network,
        rows: &[Result<ImportRow, String>],
    ) -> ImportSummary {
        let received_at = TimeMs::now();
        let mut summary = ImportSummary {
            imported: 0,
            skipped: 0,
            errors: Vec::new(),
        };

        for (idx, row) in rows.iter().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(msg) => {
                    record_error(&mut summary, idx, msg);
                    continue;
                }
            };
            let raw = row_payload(network, row);
            let row_time = row_time(row).unwrap_or(received_at);

            match adapters::normalize(network, &raw, row_time) {
                Ok(Normalized::Intent(intent)) => {
                    let resolved = match self.resolver.resolve(&intent.token).await {
                        Ok(r) => r,
                        Err(e) => {
                            record_error(&mut summary, idx, &format!("attribution lookup failed: {}", e));
                            continue;
                        }
                    };
                    match self.ledger.record(&intent, resolved).await {
                        Ok(_) => summary.imported += 1,
                        Err(e) => {
                            record_error(&mut summary, idx, &format!("ledger write failed: {}", e));
                        }
                    }
                }
                Ok(Normalized::Skipped { reason }) => {
                    record_error(&mut summary, idx, &reason);
                }
                Err(e) => {
                    warn!(network = %network, row = idx, payload = %raw.to_log_string(), "import row rejected");
                    record_error(&mut summary, idx, &e.to_string());
                }
            }
        }

        summary
    }
}

fn record_error(summary: &mut ImportSummary, idx: usize, message: &str) {
    summary.skipped += 1;
    if summary.errors.len() < MAX_REPORTED_ERRORS {
        summary.errors.push(format!("row {}: {}", idx, message));
    }
}

/// Map the fixed import columns onto the network's own field names so the
/// row goes through the same alias tables as a live callback.
fn row_payload(network: Network, row: &ImportRow) -> RawPayload {
    let mut raw = RawPayload::new();
    if let Some(tracking_id) = &row.tracking_id {
        raw.insert(network.tracking_param(), tracking_id);
    }
    if let Some(order_id) = &row.order_id {
        raw.insert("order_id", order_id);
    }
    if let Some(amount) = &row.amount {
        raw.insert("amount", amount);
    }
    if let Some(status) = &row.status {
        raw.insert("status", status);
    }
    raw
}

/// Row timestamp for synthesized order ids: the report's own date when it
/// parses, otherwise the receive time.
fn row_time(row: &ImportRow) -> Option<TimeMs> {
    let date = row.date.as_deref()?.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        return Some(TimeMs::new(dt.timestamp_millis()));
    }
    let day = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let midnight = day.and_hms_opt(0, 0, 0)?;
    Some(TimeMs::new(midnight.and_utc().timestamp_millis()))
}
