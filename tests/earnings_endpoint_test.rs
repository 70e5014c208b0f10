//! Earnings read path: auth, formatting, and status partitioning.

use axum::http::StatusCode;
use kickback::api::{self, AppState, StaticTokenPolicy};
use kickback::config::Config;
use kickback::db::init_db;
use kickback::domain::{CommissionIntent, CommissionStatus, MemberId, TimeMs};
use kickback::{Network, Repository};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

const MEMBER_TOKEN: &str = "memtok-m1";

struct TestApp {
    app: axum::Router,
    repo: Arc<Repository>,
    _temp: TempDir,
}

async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    let mut member_tokens = HashMap::new();
    member_tokens.insert(MEMBER_TOKEN.to_string(), "m1".to_string());

    let config = Config {
        port: 0,
        database_path: db_path,
        admin_token: "admin-secret".to_string(),
        member_tokens,
        retailers: HashMap::new(),
    };
    let auth = Arc::new(StaticTokenPolicy::from_config(&config));
    let app = api::create_router(AppState::new(repo.clone(), config, auth));

    TestApp {
        app,
        repo,
        _temp: temp_dir,
    }
}

async fn get(
    app: axum::Router,
    uri: &str,
    bearer: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = axum::http::Request::builder().method("GET").uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let req = builder.body(axum::body::Body::empty()).unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn get_earnings(app: axum::Router, bearer: Option<&str>) -> (StatusCode, serde_json::Value) {
    get(app, "/v1/earnings", bearer).await
}

fn intent(order_id: &str, cents: i64, status: CommissionStatus) -> CommissionIntent {
    CommissionIntent {
        network: Network::Amazon,
        external_order_id: order_id.to_string(),
        token: "t1".to_string(),
        gross_amount_cents: cents,
        status,
    }
}

#[tokio::test]
async fn test_earnings_requires_member_auth() {
    let test_app = setup_test_app().await;

    let (status, _) = get_earnings(test_app.app.clone(), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get_earnings(test_app.app.clone(), Some("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_earnings_zero_for_new_member() {
    let test_app = setup_test_app().await;

    let (status, body) = get_earnings(test_app.app.clone(), Some(MEMBER_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["memberId"], "m1");
    assert_eq!(body["pendingCents"], 0);
    assert_eq!(body["approvedCents"], 0);
    assert_eq!(body["totalCents"], 0);
    assert_eq!(body["total"], "$0.00");
}

#[tokio::test]
async fn test_earnings_partitions_and_formats() {
    let test_app = setup_test_app().await;
    let m = MemberId::new("m1".to_string());

    test_app
        .repo
        .upsert_commission(
            &intent("o1", 1250, CommissionStatus::Approved),
            &m,
            TimeMs::new(1000),
        )
        .await
        .unwrap();
    test_app
        .repo
        .upsert_commission(
            &intent("o2", 305, CommissionStatus::Pending),
            &m,
            TimeMs::new(1000),
        )
        .await
        .unwrap();
    test_app
        .repo
        .upsert_commission(
            &intent("o3", 999, CommissionStatus::Declined),
            &m,
            TimeMs::new(1000),
        )
        .await
        .unwrap();

    let (status, body) = get_earnings(test_app.app.clone(), Some(MEMBER_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pendingCents"], 305);
    assert_eq!(body["approvedCents"], 1250);
    assert_eq!(body["totalCents"], 1250);
    assert_eq!(body["pending"], "$3.05");
    assert_eq!(body["approved"], "$12.50");
    assert_eq!(body["total"], "$12.50");
}

#[tokio::test]
async fn test_commission_history_lists_member_rows_newest_first() {
    let test_app = setup_test_app().await;
    let m = MemberId::new("m1".to_string());

    test_app
        .repo
        .upsert_commission(
            &intent("o1", 500, CommissionStatus::Pending),
            &m,
            TimeMs::new(1000),
        )
        .await
        .unwrap();
    test_app
        .repo
        .upsert_commission(
            &intent("o2", 999, CommissionStatus::Declined),
            &m,
            TimeMs::new(2000),
        )
        .await
        .unwrap();

    let (status, body) = get(test_app.app.clone(), "/v1/commissions", Some(MEMBER_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    // Newest first; declined rows stay visible in the history.
    assert_eq!(body["commissions"][0]["externalOrderId"], "o2");
    assert_eq!(body["commissions"][0]["status"], "declined");
    assert_eq!(body["commissions"][1]["amount"], "$5.00");
}

#[tokio::test]
async fn test_commission_history_requires_member_auth() {
    let test_app = setup_test_app().await;
    let (status, _) = get(test_app.app.clone(), "/v1/commissions", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_earnings_only_sees_own_member_rows() {
    let test_app = setup_test_app().await;

    test_app
        .repo
        .upsert_commission(
            &intent("o1", 700, CommissionStatus::Approved),
            &MemberId::new("someone-else".to_string()),
            TimeMs::new(1000),
        )
        .await
        .unwrap();

    let (_, body) = get_earnings(test_app.app.clone(), Some(MEMBER_TOKEN)).await;
    assert_eq!(body["approvedCents"], 0);
}
