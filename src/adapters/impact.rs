//! Impact payload normalization.
//!
//! Impact reports the tracking token as `SubId1` (postback) or `clickRef`
//! (legacy event API), the conversion as `ActionId`/`Oid`, and the money as
//! `Payout`. Action state arrives under `State` or `ActionStatus`.

use super::AliasTable;
use crate::domain::Network;

pub static ALIASES: AliasTable = AliasTable {
    network: Network::Impact,
    token: &["subid1", "sub1", "subid", "clickref"],
    order_id: &["actionid", "action_id", "oid", "order_id", "orderid"],
    amount: &["payout", "amount", "commission"],
    status: &["state", "status", "actionstatus", "action_status"],
};
