use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    config::Config,
    error::Result,
    models::{CastSubmission, SnapshotPeriod, SnapshotRow},
};

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ==================== SUBMISSION QUERIES ====================
impl Database {
    /// Records a verified cast submission. Re-deliveries of the same cast
    /// hash are ignored.
    pub async fn insert_submission(&self, cast_hash: &str, eth_address: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO cast_submissions (cast_hash, eth_address)
             VALUES ($1, $2)
             ON CONFLICT (cast_hash) DO NOTHING",
        )
        .bind(cast_hash)
        .bind(eth_address)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn recent_submissions(&self, limit: i64) -> Result<Vec<CastSubmission>> {
        let rows = sqlx::query_as::<_, CastSubmission>(
            "SELECT cast_hash, eth_address, created_at
             FROM cast_submissions
             ORDER BY created_at DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Every address that has ever submitted a cast. Drives the snapshot job
    /// and the live leaderboard fan-out.
    pub async fn distinct_addresses(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT eth_address FROM cast_submissions")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(address,)| address).collect())
    }
}

// ==================== SNAPSHOT QUERIES ====================
impl Database {
    pub async fn latest_snapshot_time(
        &self,
        period: SnapshotPeriod,
    ) -> Result<Option<DateTime<Utc>>> {
        // Table names are static strings from SnapshotPeriod, never user input.
        let query = format!("SELECT MAX(snapshot_time) FROM {}", period.table());
        let latest: Option<DateTime<Utc>> = sqlx::query_scalar(&query)
            .fetch_one(&self.pool)
            .await?;
        Ok(latest)
    }

    /// Upserts one ranked row, keyed by address. Running the snapshot twice
    /// with unchanged chain state rewrites identical rows instead of
    /// duplicating them.
    pub async fn upsert_snapshot_row(
        &self,
        period: SnapshotPeriod,
        rank: i32,
        eth_address: &str,
        total_damage: &str,
        accumulated_damage: &str,
        snapshot_time: DateTime<Utc>,
    ) -> Result<()> {
        let query = format!(
            "INSERT INTO {} (rank, eth_address, total_damage, accumulated_damage, snapshot_time)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (eth_address) DO UPDATE
             SET rank = EXCLUDED.rank,
                 total_damage = EXCLUDED.total_damage,
                 accumulated_damage = EXCLUDED.accumulated_damage,
                 snapshot_time = EXCLUDED.snapshot_time",
            period.table()
        );
        sqlx::query(&query)
            .bind(rank)
            .bind(eth_address)
            .bind(total_damage)
            .bind(accumulated_damage)
            .bind(snapshot_time)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn top_snapshot_rows(
        &self,
        period: SnapshotPeriod,
        limit: i64,
    ) -> Result<Vec<SnapshotRow>> {
        let query = format!(
            "SELECT rank, eth_address, total_damage, accumulated_damage, snapshot_time
             FROM {}
             ORDER BY rank ASC
             LIMIT $1",
            period.table()
        );
        let rows = sqlx::query_as::<_, SnapshotRow>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn snapshot_row_for_address(
        &self,
        period: SnapshotPeriod,
        eth_address: &str,
    ) -> Result<Option<SnapshotRow>> {
        let query = format!(
            "SELECT rank, eth_address, total_damage, accumulated_damage, snapshot_time
             FROM {}
             WHERE eth_address = $1",
            period.table()
        );
        let row = sqlx::query_as::<_, SnapshotRow>(&query)
            .bind(eth_address)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
