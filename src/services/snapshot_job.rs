use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use ethers::types::U256;
use tokio::sync::Mutex;
use tokio::time::{interval, Duration};

use crate::{
    chain::{parse_address, ChainClient},
    constants::SNAPSHOT_CHECK_INTERVAL_SECS,
    db::Database,
    error::Result,
    models::SnapshotPeriod,
    services::report::BatchReport,
};

/// Damage readings for one address before ranking.
pub struct AddressDamage {
    pub address: String,
    pub total_damage: U256,
    pub accumulated_damage: U256,
}

/// A ranked leaderboard row ready to be persisted.
pub struct RankedDamage {
    pub rank: i32,
    pub address: String,
    pub total_damage: U256,
    pub accumulated_damage: U256,
    pub combined_damage: U256,
}

/// Orders by combined damage descending and assigns 1-based ranks. The sort
/// is stable, so equal scores keep their input order.
pub fn rank_by_combined(mut entries: Vec<AddressDamage>) -> Vec<RankedDamage> {
    entries.sort_by(|a, b| {
        let a_combined = a.total_damage.saturating_add(a.accumulated_damage);
        let b_combined = b.total_damage.saturating_add(b.accumulated_damage);
        b_combined.cmp(&a_combined)
    });

    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| RankedDamage {
            rank: i as i32 + 1,
            combined_damage: entry.total_damage.saturating_add(entry.accumulated_damage),
            address: entry.address,
            total_damage: entry.total_damage,
            accumulated_damage: entry.accumulated_damage,
        })
        .collect()
}

/// A snapshot is due when more than the full period has elapsed since the
/// latest stored snapshot_time; a table with no rows is always due.
pub fn snapshot_due(
    last: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    period_secs: i64,
) -> bool {
    match last {
        None => true,
        Some(last) => now - last > ChronoDuration::seconds(period_secs),
    }
}

fn check_interval_secs() -> u64 {
    std::env::var("SNAPSHOT_CHECK_INTERVAL_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(SNAPSHOT_CHECK_INTERVAL_SECS)
}

/// Snapshot Job - periodically freezes the ranked combined-damage
/// leaderboard into the weekly and monthly tables. Weekly and monthly
/// cadences are evaluated independently on every check.
pub struct SnapshotJob {
    db: Database,
    chain: Arc<ChainClient>,
    running: Mutex<()>,
}

impl SnapshotJob {
    pub fn new(db: Database, chain: Arc<ChainClient>) -> Self {
        Self {
            db,
            chain,
            running: Mutex::new(()),
        }
    }

    pub async fn start(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(check_interval_secs()));

            loop {
                ticker.tick().await;

                let Ok(_guard) = self.running.try_lock() else {
                    tracing::warn!("Snapshot run still in flight; skipping tick");
                    continue;
                };

                if let Err(e) = self.run_due_snapshots().await {
                    tracing::error!("Snapshot job error: {}", e);
                }
            }
        });
    }

    pub async fn run_due_snapshots(&self) -> Result<()> {
        let now = Utc::now();

        for period in [SnapshotPeriod::Weekly, SnapshotPeriod::Monthly] {
            let last = self.db.latest_snapshot_time(period).await?;
            if !snapshot_due(last, now, period.period_secs()) {
                tracing::debug!(period = period.label(), "snapshot not due");
                continue;
            }

            tracing::info!(period = period.label(), "taking snapshot");
            let report = self.take_snapshot(period, now).await?;
            report.emit();
        }

        Ok(())
    }

    /// Reads every known address, ranks by combined damage, upserts rows.
    /// A failing chain read drops that address from this snapshot only.
    async fn take_snapshot(
        &self,
        period: SnapshotPeriod,
        snapshot_time: DateTime<Utc>,
    ) -> Result<BatchReport> {
        let mut report = BatchReport::new(match period {
            SnapshotPeriod::Weekly => "weekly_snapshot",
            SnapshotPeriod::Monthly => "monthly_snapshot",
        });

        let addresses = self.db.distinct_addresses().await?;
        let mut readings = Vec::with_capacity(addresses.len());

        for address in addresses {
            let parsed = match parse_address(&address) {
                Ok(parsed) => parsed,
                Err(e) => {
                    report.record_skip(address, e);
                    continue;
                }
            };

            match self.chain.fetch_user_stats(parsed).await {
                Ok(stats) => readings.push(AddressDamage {
                    address,
                    total_damage: stats.total_damage,
                    accumulated_damage: stats.accumulated_damage,
                }),
                // Unregistered users revert; they simply miss this snapshot.
                Err(e) => report.record_skip(address, e),
            }
        }

        for entry in rank_by_combined(readings) {
            let result = self
                .db
                .upsert_snapshot_row(
                    period,
                    entry.rank,
                    &entry.address,
                    &entry.total_damage.to_string(),
                    &entry.accumulated_damage.to_string(),
                    snapshot_time,
                )
                .await;

            match result {
                Ok(()) => report.record_ok(),
                Err(e) => report.record_skip(entry.address, e),
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    const DAY: i64 = 24 * 3600;

    #[test]
    fn empty_table_is_always_due() {
        assert!(snapshot_due(None, at(0), 7 * DAY));
    }

    #[test]
    fn weekly_fires_only_after_seven_full_days() {
        let last = at(0);
        assert!(!snapshot_due(Some(last), at(6 * DAY), 7 * DAY));
        assert!(!snapshot_due(Some(last), at(7 * DAY), 7 * DAY));
        assert!(snapshot_due(Some(last), at(7 * DAY + 1), 7 * DAY));
    }

    #[test]
    fn monthly_fires_only_after_thirty_full_days() {
        let last = at(0);
        assert!(!snapshot_due(Some(last), at(29 * DAY), 30 * DAY));
        assert!(snapshot_due(Some(last), at(30 * DAY + 1), 30 * DAY));
    }

    #[test]
    fn cadences_are_evaluated_independently() {
        // Nine days in: the weekly snapshot is due again, the monthly is not.
        let last = at(0);
        let now = at(9 * DAY);
        assert!(snapshot_due(Some(last), now, 7 * DAY));
        assert!(!snapshot_due(Some(last), now, 30 * DAY));
    }

    fn reading(address: &str, total: u64, accumulated: u64) -> AddressDamage {
        AddressDamage {
            address: address.to_string(),
            total_damage: U256::from(total),
            accumulated_damage: U256::from(accumulated),
        }
    }

    #[test]
    fn ranks_by_combined_score_descending() {
        let ranked = rank_by_combined(vec![
            reading("A", 60, 40),  // 100
            reading("B", 50, 0),   // 50
            reading("C", 150, 50), // 200
        ]);

        let order: Vec<(&str, i32, String)> = ranked
            .iter()
            .map(|r| (r.address.as_str(), r.rank, r.combined_damage.to_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("C", 1, "200".to_string()),
                ("A", 2, "100".to_string()),
                ("B", 3, "50".to_string()),
            ]
        );
    }

    #[test]
    fn equal_scores_keep_input_order() {
        let ranked = rank_by_combined(vec![reading("A", 10, 0), reading("B", 5, 5)]);
        assert_eq!(ranked[0].address, "A");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].address, "B");
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn ranking_handles_values_beyond_native_integers() {
        let huge = AddressDamage {
            address: "huge".to_string(),
            total_damage: U256::from(u128::MAX),
            accumulated_damage: U256::from(u128::MAX),
        };
        let small = reading("small", 1, 0);

        let ranked = rank_by_combined(vec![small, huge]);
        assert_eq!(ranked[0].address, "huge");
        assert_eq!(
            ranked[0].combined_damage.to_string(),
            "680564733841876926926749214863536422910"
        );
    }
}
