//! Domain types for the commission attribution ledger.
//!
//! This module provides:
//! - Domain primitives: MemberId, RetailerId, TimeMs, Network
//! - Click and Commission ledger types with canonical JSON serialization
//! - Integer-cents money parsing and formatting
//! - Tracking token generation

pub mod click;
pub mod commission;
pub mod money;
pub mod primitives;
pub mod token;

pub use click::Click;
pub use commission::{Commission, CommissionIntent, CommissionStatus, MemberBalance};
pub use primitives::{MemberId, Network, RetailerId, TimeMs, UNATTRIBUTED};
