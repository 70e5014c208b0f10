//! Repository layer for database operations.
//!
//! All SQL lives here. The commissions table is the only mutable shared
//! resource in the system; every write to it goes through
//! [`Repository::upsert_commission`], a single atomic conditional statement.

use crate::domain::{
    Click, Commission, CommissionIntent, CommissionStatus, MemberBalance, MemberId, Network,
    RetailerId, TimeMs, UNATTRIBUTED,
};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Cheap liveness check against the pool, for the readiness probe.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // =========================================================================
    // Click operations
    // =========================================================================

    /// Insert a click record. Clicks are immutable and never deleted.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_click(&self, click: &Click) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO clicks (token, member_id, retailer_id, network, user_agent, created_at_ms)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&click.token)
        .bind(click.member_id.as_str())
        .bind(click.retailer_id.as_str())
        .bind(click.network.as_str())
        .bind(click.user_agent.as_deref())
        .bind(click.created_at_ms.as_ms())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Find the earliest click recorded for a token.
    ///
    /// The generator never reuses a token, but stored duplicates are possible
    /// under replay or tampering; the earliest row wins deterministically.
    pub async fn find_click_by_token(&self, token: &str) -> Result<Option<Click>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT token, member_id, retailer_id, network, user_agent, created_at_ms
            FROM clicks
            WHERE token = ?
            ORDER BY created_at_ms ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        row.map(click_from_row).transpose()
    }

    // =========================================================================
    // Commission ledger operations
    // =========================================================================

    /// Atomically insert-or-merge a commission keyed on (network, external_order_id).
    ///
    /// Merge rules, expressed entirely in the conditional write so concurrent
    /// deliveries serialize inside SQLite:
    /// - `declined` is sticky: a reversal claws back approved/pending and is
    ///   never overwritten by a later pending/approved callback;
    /// - an unattributed member id is replaced once a callback resolves;
    /// - an empty stored token is filled in when a callback carries one;
    /// - the guard `WHERE` makes a byte-identical replay a no-op, leaving
    ///   `updated_at_ms` untouched.
    ///
    /// Returns the stored row after the write.
    ///
    /// # Errors
    /// Returns an error if the write or the follow-up read fails.
    pub async fn upsert_commission(
        &self,
        intent: &CommissionIntent,
        member_id: &MemberId,
        now: TimeMs,
    ) -> Result<Commission, sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO commissions
                (network, external_order_id, member_id, token, gross_amount_cents, status,
                 created_at_ms, updated_at_ms)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(network, external_order_id) DO UPDATE SET
                member_id = CASE
                    WHEN commissions.member_id = ? THEN excluded.member_id
                    ELSE commissions.member_id
                END,
                token = CASE
                    WHEN commissions.token = '' THEN excluded.token
                    ELSE commissions.token
                END,
                gross_amount_cents = excluded.gross_amount_cents,
                status = CASE
                    WHEN commissions.status = 'declined' THEN 'declined'
                    ELSE excluded.status
                END,
                updated_at_ms = excluded.updated_at_ms
            WHERE commissions.gross_amount_cents <> excluded.gross_amount_cents
               OR (commissions.status <> 'declined' AND commissions.status <> excluded.status)
               OR (commissions.member_id = ? AND excluded.member_id <> commissions.member_id)
               OR (commissions.token = '' AND excluded.token <> '')
            "#,
        )
        .bind(intent.network.as_str())
        .bind(&intent.external_order_id)
        .bind(member_id.as_str())
        .bind(&intent.token)
        .bind(intent.gross_amount_cents)
        .bind(intent.status.as_str())
        .bind(now.as_ms())
        .bind(now.as_ms())
        .bind(UNATTRIBUTED)
        .bind(UNATTRIBUTED)
        .execute(&self.pool)
        .await?;

        let row = self
            .get_commission(intent.network, &intent.external_order_id)
            .await?;
        row.ok_or(sqlx::Error::RowNotFound)
    }

    /// Fetch a commission by its ledger key.
    pub async fn get_commission(
        &self,
        network: Network,
        external_order_id: &str,
    ) -> Result<Option<Commission>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT network, external_order_id, member_id, token, gross_amount_cents, status,
                   created_at_ms, updated_at_ms
            FROM commissions
            WHERE network = ? AND external_order_id = ?
            "#,
        )
        .bind(network.as_str())
        .bind(external_order_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(commission_from_row).transpose()
    }

    /// Query all commissions recorded for a member, newest first.
    pub async fn query_commissions_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<Commission>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT network, external_order_id, member_id, token, gross_amount_cents, status,
                   created_at_ms, updated_at_ms
            FROM commissions
            WHERE member_id = ?
            ORDER BY created_at_ms DESC, id DESC
            "#,
        )
        .bind(member_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(commission_from_row).collect()
    }

    /// Commissions parked under the unattributed sentinel, oldest first,
    /// for manual reconciliation.
    pub async fn query_unattributed(&self, limit: i64) -> Result<Vec<Commission>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT network, external_order_id, member_id, token, gross_amount_cents, status,
                   created_at_ms, updated_at_ms
            FROM commissions
            WHERE member_id = ?
            ORDER BY created_at_ms ASC, id ASC
            LIMIT ?
            "#,
        )
        .bind(UNATTRIBUTED)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(commission_from_row).collect()
    }

    /// Sum a member's commissions partitioned by status.
    ///
    /// Amounts are integer cents, so SQLite's SUM is exact. Declined rows are
    /// excluded from every total; `total_cents` is the approved sum.
    pub async fn balance_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<MemberBalance, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT status, SUM(gross_amount_cents) AS cents
            FROM commissions
            WHERE member_id = ?
            GROUP BY status
            "#,
        )
        .bind(member_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        let mut balance = MemberBalance::default();
        for row in rows {
            let status: String = row.get("status");
            let cents: i64 = row.get("cents");
            match CommissionStatus::parse(&status) {
                Some(CommissionStatus::Pending) => balance.pending_cents = cents,
                Some(CommissionStatus::Approved) => balance.approved_cents = cents,
                Some(CommissionStatus::Declined) | None => {}
            }
        }
        balance.total_cents = balance.approved_cents;

        Ok(balance)
    }
}

fn click_from_row(row: SqliteRow) -> Result<Click, sqlx::Error> {
    let network_str: String = row.get("network");
    let network = parse_column(Network::parse(&network_str), "clicks.network", &network_str)?;

    Ok(Click {
        token: row.get("token"),
        member_id: MemberId::new(row.get("member_id")),
        retailer_id: RetailerId::new(row.get("retailer_id")),
        network,
        user_agent: row.get("user_agent"),
        created_at_ms: TimeMs::new(row.get("created_at_ms")),
    })
}

fn commission_from_row(row: SqliteRow) -> Result<Commission, sqlx::Error> {
    let network_str: String = row.get("network");
    let network = parse_column(
        Network::parse(&network_str),
        "commissions.network",
        &network_str,
    )?;

    let status_str: String = row.get("status");
    let status = parse_column(
        CommissionStatus::parse(&status_str),
        "commissions.status",
        &status_str,
    )?;

    Ok(Commission {
        network,
        external_order_id: row.get("external_order_id"),
        member_id: MemberId::new(row.get("member_id")),
        token: row.get("token"),
        gross_amount_cents: row.get("gross_amount_cents"),
        status,
        created_at_ms: TimeMs::new(row.get("created_at_ms")),
        updated_at_ms: TimeMs::new(row.get("updated_at_ms")),
    })
}

fn parse_column<T>(parsed: Option<T>, column: &str, raw: &str) -> Result<T, sqlx::Error> {
    parsed.ok_or_else(|| {
        sqlx::Error::Decode(format!("unrecognized {} value: {}", column, raw).into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::init_db;
    use tempfile::TempDir;

    async fn setup_test_db() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    fn intent(
        order_id: &str,
        token: &str,
        cents: i64,
        status: CommissionStatus,
    ) -> CommissionIntent {
        CommissionIntent {
            network: Network::Amazon,
            external_order_id: order_id.to_string(),
            token: token.to_string(),
            gross_amount_cents: cents,
            status,
        }
    }

    fn member(id: &str) -> MemberId {
        MemberId::new(id.to_string())
    }

    #[tokio::test]
    async fn test_insert_and_find_click() {
        let (repo, _temp) = setup_test_db().await;

        let click = Click::new(
            "t1".to_string(),
            member("m1"),
            RetailerId::new("amazonBusiness".to_string()),
            Network::Amazon,
            Some("Mozilla/5.0".to_string()),
        );
        repo.insert_click(&click).await.unwrap();

        let found = repo.find_click_by_token("t1").await.unwrap().unwrap();
        assert_eq!(found, click);

        assert!(repo.find_click_by_token("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_token_resolves_to_earliest_click() {
        let (repo, _temp) = setup_test_db().await;

        let mut first = Click::new(
            "t1".to_string(),
            member("m1"),
            RetailerId::new("r1".to_string()),
            Network::Awin,
            None,
        );
        first.created_at_ms = TimeMs::new(1000);
        let mut second = first.clone();
        second.member_id = member("m2");
        second.created_at_ms = TimeMs::new(2000);

        // Insert newer row first to prove ordering is by time, not insertion.
        repo.insert_click(&second).await.unwrap();
        repo.insert_click(&first).await.unwrap();

        let found = repo.find_click_by_token("t1").await.unwrap().unwrap();
        assert_eq!(found.member_id, member("m1"));
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_replay_is_noop() {
        let (repo, _temp) = setup_test_db().await;

        let i = intent("o1", "t1", 1250, CommissionStatus::Approved);
        let stored = repo
            .upsert_commission(&i, &member("m1"), TimeMs::new(1000))
            .await
            .unwrap();
        assert_eq!(stored.gross_amount_cents, 1250);
        assert_eq!(stored.status, CommissionStatus::Approved);
        assert_eq!(stored.created_at_ms, TimeMs::new(1000));

        // Identical replay at a later time must not touch the row.
        let replayed = repo
            .upsert_commission(&i, &member("m1"), TimeMs::new(9999))
            .await
            .unwrap();
        assert_eq!(replayed, stored);
        assert_eq!(replayed.updated_at_ms, TimeMs::new(1000));
    }

    #[tokio::test]
    async fn test_upsert_merges_status_change() {
        let (repo, _temp) = setup_test_db().await;

        let pending = intent("o1", "t1", 1250, CommissionStatus::Pending);
        repo.upsert_commission(&pending, &member("m1"), TimeMs::new(1000))
            .await
            .unwrap();

        let approved = intent("o1", "t1", 1250, CommissionStatus::Approved);
        let stored = repo
            .upsert_commission(&approved, &member("m1"), TimeMs::new(2000))
            .await
            .unwrap();

        assert_eq!(stored.status, CommissionStatus::Approved);
        assert_eq!(stored.created_at_ms, TimeMs::new(1000));
        assert_eq!(stored.updated_at_ms, TimeMs::new(2000));
    }

    #[tokio::test]
    async fn test_declined_is_sticky() {
        let (repo, _temp) = setup_test_db().await;

        let approved = intent("o1", "t1", 1250, CommissionStatus::Approved);
        repo.upsert_commission(&approved, &member("m1"), TimeMs::new(1000))
            .await
            .unwrap();

        let declined = intent("o1", "t1", 1250, CommissionStatus::Declined);
        let stored = repo
            .upsert_commission(&declined, &member("m1"), TimeMs::new(2000))
            .await
            .unwrap();
        assert_eq!(stored.status, CommissionStatus::Declined);

        // A late approved callback cannot resurrect a reversed commission.
        let stored = repo
            .upsert_commission(&approved, &member("m1"), TimeMs::new(3000))
            .await
            .unwrap();
        assert_eq!(stored.status, CommissionStatus::Declined);
    }

    #[tokio::test]
    async fn test_unattributed_member_filled_in_later() {
        let (repo, _temp) = setup_test_db().await;

        let i = intent("o1", "", 1250, CommissionStatus::Pending);
        repo.upsert_commission(&i, &MemberId::unattributed(), TimeMs::new(1000))
            .await
            .unwrap();

        let i = intent("o1", "t1", 1250, CommissionStatus::Pending);
        let stored = repo
            .upsert_commission(&i, &member("m1"), TimeMs::new(2000))
            .await
            .unwrap();
        assert_eq!(stored.member_id, member("m1"));
        assert_eq!(stored.token, "t1");

        // A resolved member is never overwritten by another.
        let stored = repo
            .upsert_commission(&i, &member("m2"), TimeMs::new(3000))
            .await
            .unwrap();
        assert_eq!(stored.member_id, member("m1"));
    }

    #[tokio::test]
    async fn test_same_order_id_on_different_networks_is_distinct() {
        let (repo, _temp) = setup_test_db().await;

        let amazon = intent("o1", "t1", 100, CommissionStatus::Pending);
        let awin = CommissionIntent {
            network: Network::Awin,
            ..amazon.clone()
        };
        repo.upsert_commission(&amazon, &member("m1"), TimeMs::new(1000))
            .await
            .unwrap();
        repo.upsert_commission(&awin, &member("m1"), TimeMs::new(1000))
            .await
            .unwrap();

        let rows = repo
            .query_commissions_for_member(&member("m1"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_balance_partitions_by_status() {
        let (repo, _temp) = setup_test_db().await;
        let m = member("m1");

        repo.upsert_commission(
            &intent("o1", "t1", 1000, CommissionStatus::Approved),
            &m,
            TimeMs::new(1000),
        )
        .await
        .unwrap();
        repo.upsert_commission(
            &intent("o2", "t1", 300, CommissionStatus::Pending),
            &m,
            TimeMs::new(1000),
        )
        .await
        .unwrap();
        repo.upsert_commission(
            &intent("o3", "t1", 700, CommissionStatus::Declined),
            &m,
            TimeMs::new(1000),
        )
        .await
        .unwrap();

        let balance = repo.balance_for_member(&m).await.unwrap();
        assert_eq!(balance.pending_cents, 300);
        assert_eq!(balance.approved_cents, 1000);
        assert_eq!(balance.total_cents, 1000);
    }

    #[tokio::test]
    async fn test_reversal_claws_back_from_balance() {
        let (repo, _temp) = setup_test_db().await;
        let m = member("m1");

        repo.upsert_commission(
            &intent("o1", "t1", 1250, CommissionStatus::Approved),
            &m,
            TimeMs::new(1000),
        )
        .await
        .unwrap();
        assert_eq!(repo.balance_for_member(&m).await.unwrap().total_cents, 1250);

        repo.upsert_commission(
            &intent("o1", "t1", 1250, CommissionStatus::Declined),
            &m,
            TimeMs::new(2000),
        )
        .await
        .unwrap();

        let balance = repo.balance_for_member(&m).await.unwrap();
        assert_eq!(balance.total_cents, 0);
        assert_eq!(balance.pending_cents, 0);

        // The row itself survives for audit.
        let row = repo.get_commission(Network::Amazon, "o1").await.unwrap();
        assert_eq!(row.unwrap().status, CommissionStatus::Declined);
    }

    #[tokio::test]
    async fn test_unattributed_report_excluded_from_member_balance() {
        let (repo, _temp) = setup_test_db().await;

        repo.upsert_commission(
            &intent("o1", "ghost", 500, CommissionStatus::Pending),
            &MemberId::unattributed(),
            TimeMs::new(1000),
        )
        .await
        .unwrap();

        let unattributed = repo.query_unattributed(50).await.unwrap();
        assert_eq!(unattributed.len(), 1);
        assert_eq!(unattributed[0].gross_amount_cents, 500);

        let balance = repo.balance_for_member(&member("m1")).await.unwrap();
        assert_eq!(balance, MemberBalance::default());
    }
}
