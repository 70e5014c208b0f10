//! Amazon Associates payload normalization.
//!
//! Amazon echoes the tracking token back under `ascsubtag` on standard
//! reports, though partner integrations have been seen using `subId` and
//! plain `ref`. The commission figure arrives as `ad_fee` on fee reports
//! and `amount` on the callback shim.

use super::AliasTable;
use crate::domain::Network;

pub static ALIASES: AliasTable = AliasTable {
    network: Network::Amazon,
    token: &["ascsubtag", "subid", "sub_id", "ref", "tag"],
    order_id: &["order_id", "orderid", "order-id"],
    amount: &["amount", "ad_fee", "adfee", "commission", "earnings"],
    status: &["status", "state"],
};
