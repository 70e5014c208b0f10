pub mod admin;
pub mod auth;
pub mod clicks;
pub mod commissions;
pub mod earnings;
pub mod health;
pub mod webhooks;

use crate::config::Config;
use crate::db::Repository;
use crate::ledger::{AttributionResolver, BatchImporter, CommissionLedger, EarningsAggregator};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub use auth::{AuthPolicy, StaticTokenPolicy};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
    pub auth: Arc<dyn AuthPolicy>,
    pub resolver: Arc<AttributionResolver>,
    pub ledger: Arc<CommissionLedger>,
    pub aggregator: Arc<EarningsAggregator>,
    pub importer: Arc<BatchImporter>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: Config, auth: Arc<dyn AuthPolicy>) -> Self {
        let resolver = Arc::new(AttributionResolver::new(repo.clone()));
        let ledger = Arc::new(CommissionLedger::new(repo.clone()));
        let aggregator = Arc::new(EarningsAggregator::new(repo.clone()));
        let importer = Arc::new(BatchImporter::new(resolver.clone(), ledger.clone()));

        Self {
            repo,
            config: Arc::new(config),
            auth,
            resolver,
            ledger,
            aggregator,
            importer,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/clicks", post(clicks::create_click))
        .route(
            "/v1/webhooks/:network",
            get(webhooks::receive).post(webhooks::receive),
        )
        .route("/v1/earnings", get(earnings::get_earnings))
        .route("/v1/commissions", get(commissions::list_commissions))
        .route("/v1/admin/import", post(admin::import))
        .route("/v1/admin/unattributed", get(admin::unattributed))
        .layer(cors)
        .with_state(state)
}
