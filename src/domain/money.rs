//! Money handling: vendor decimal strings to integer cents and back.
//!
//! Vendors report amounts as USD decimal strings ("12.50", "12.5", "12").
//! The ledger stores integer cents, which makes SQLite SUM exact and keeps
//! arithmetic lossless without carrying a decimal type through the schema.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Parse a vendor amount string into integer cents.
///
/// Returns None for unparseable input, including amounts that overflow the
/// cents scale. Rounds to the nearest cent, half away from zero, so "0.005"
/// becomes 1.
pub fn parse_amount_cents(raw: &str) -> Option<i64> {
    let trimmed = raw.trim().trim_start_matches('$');
    let amount = Decimal::from_str(trimmed).ok()?;
    // checked_mul: Decimal parses values large enough that scaling to cents
    // overflows, and vendor input must never panic a handler.
    let cents = amount
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    cents.to_i64()
}

/// Format integer cents as a display currency string, e.g. 1250 -> "$12.50".
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}
