pub mod adapters;
pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod ledger;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    Click, Commission, CommissionIntent, CommissionStatus, MemberBalance, MemberId, Network,
    RetailerId, TimeMs,
};
pub use error::AppError;
pub use ledger::{AttributionResolver, BatchImporter, CommissionLedger, EarningsAggregator};
