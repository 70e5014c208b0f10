//! Awin payload normalization.
//!
//! Awin echoes the tracking token under `clickRef`, keys transactions by
//! `orderRef` (or `transactionId` on the transaction API), and reports the
//! money as `commissionAmount`. `commissionStatus` carries
//! pending/approved/declined in vendor spelling.

use super::AliasTable;
use crate::domain::Network;

pub static ALIASES: AliasTable = AliasTable {
    network: Network::Awin,
    token: &["clickref", "click_ref", "cref", "ref"],
    order_id: &[
        "orderref",
        "order_ref",
        "orderreference",
        "transactionid",
        "transaction_id",
        "order_id",
    ],
    amount: &["commissionamount", "commission_amount", "commission", "amount"],
    status: &[
        "commissionstatus",
        "commission_status",
        "status",
        "transactionstatus",
    ],
};
