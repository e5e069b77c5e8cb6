use axum::{extract::State, Json};
use ethers::types::U256;

use super::AppState;
use crate::{
    chain::parse_address,
    constants::{MONTHLY_LEADERBOARD_SIZE, WEEKLY_LEADERBOARD_SIZE},
    error::Result,
    models::{LiveEntry, LiveLeaderboardResponse, SnapshotEntry, SnapshotPeriod},
};

/// GET /api/leaderboard/snapshot/weekly - top 10 from the latest weekly
/// snapshot, already ranked at snapshot time.
pub async fn weekly_snapshot(State(state): State<AppState>) -> Result<Json<Vec<SnapshotEntry>>> {
    let rows = state
        .db
        .top_snapshot_rows(SnapshotPeriod::Weekly, WEEKLY_LEADERBOARD_SIZE)
        .await?;
    Ok(Json(rows.into_iter().map(SnapshotEntry::from).collect()))
}

/// GET /api/leaderboard/snapshot/monthly - top 3 from the latest monthly
/// snapshot.
pub async fn monthly_snapshot(State(state): State<AppState>) -> Result<Json<Vec<SnapshotEntry>>> {
    let rows = state
        .db
        .top_snapshot_rows(SnapshotPeriod::Monthly, MONTHLY_LEADERBOARD_SIZE)
        .await?;
    Ok(Json(rows.into_iter().map(SnapshotEntry::from).collect()))
}

/// One player's live chain reading plus their snapshot baselines. Addresses
/// missing from a snapshot table get a zero baseline, so their delta is
/// simply their current combined damage.
pub struct LiveReading {
    pub address: String,
    pub total_damage: U256,
    pub accumulated_damage: U256,
    pub weekly_baseline: U256,
    pub monthly_baseline: U256,
}

/// Sorts live readings by combined damage descending and computes the
/// period deltas against the snapshot baselines.
pub fn build_live_entries(mut readings: Vec<LiveReading>) -> Vec<LiveEntry> {
    readings.sort_by(|a, b| {
        let a_combined = a.total_damage.saturating_add(a.accumulated_damage);
        let b_combined = b.total_damage.saturating_add(b.accumulated_damage);
        b_combined.cmp(&a_combined)
    });

    readings
        .into_iter()
        .enumerate()
        .map(|(i, reading)| {
            let combined = reading
                .total_damage
                .saturating_add(reading.accumulated_damage);
            LiveEntry {
                rank: i as i32 + 1,
                address: reading.address,
                total_damage: reading.total_damage.to_string(),
                accumulated_damage: reading.accumulated_damage.to_string(),
                combined_damage: combined.to_string(),
                weekly_delta: combined.saturating_sub(reading.weekly_baseline).to_string(),
                monthly_delta: combined
                    .saturating_sub(reading.monthly_baseline)
                    .to_string(),
            }
        })
        .collect()
}

/// GET /api/leaderboard - live standings straight from the chain. Addresses
/// whose stats cannot be read right now are left out of this response.
pub async fn live_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<LiveLeaderboardResponse>> {
    let addresses = state.db.distinct_addresses().await?;
    let mut readings = Vec::with_capacity(addresses.len());

    for address in addresses {
        let parsed = match parse_address(&address) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "bad stored address");
                continue;
            }
        };

        let stats = match state.chain.fetch_user_stats(parsed).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "stats read failed");
                continue;
            }
        };

        let weekly_baseline = state
            .db
            .snapshot_row_for_address(SnapshotPeriod::Weekly, &address)
            .await?
            .map(|row| row.combined_damage())
            .unwrap_or_default();
        let monthly_baseline = state
            .db
            .snapshot_row_for_address(SnapshotPeriod::Monthly, &address)
            .await?
            .map(|row| row.combined_damage())
            .unwrap_or_default();

        readings.push(LiveReading {
            address,
            total_damage: stats.total_damage,
            accumulated_damage: stats.accumulated_damage,
            weekly_baseline,
            monthly_baseline,
        });
    }

    Ok(Json(LiveLeaderboardResponse {
        weekly: build_live_entries(readings),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(address: &str, total: u64, accumulated: u64, weekly: u64, monthly: u64) -> LiveReading {
        LiveReading {
            address: address.to_string(),
            total_damage: U256::from(total),
            accumulated_damage: U256::from(accumulated),
            weekly_baseline: U256::from(weekly),
            monthly_baseline: U256::from(monthly),
        }
    }

    #[test]
    fn orders_by_combined_damage_and_ranks_from_one() {
        let entries = build_live_entries(vec![
            reading("A", 100, 0, 0, 0),
            reading("B", 200, 50, 0, 0),
        ]);

        assert_eq!(entries[0].address, "B");
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[0].combined_damage, "250");
        assert_eq!(entries[1].address, "A");
        assert_eq!(entries[1].rank, 2);
    }

    #[test]
    fn deltas_subtract_the_snapshot_baselines() {
        let entries = build_live_entries(vec![reading("A", 300, 50, 100, 20)]);

        assert_eq!(entries[0].combined_damage, "350");
        assert_eq!(entries[0].weekly_delta, "250");
        assert_eq!(entries[0].monthly_delta, "330");
    }

    #[test]
    fn delta_clamps_to_zero_when_baseline_exceeds_current() {
        // Totals only grow on chain, but a stale row must not underflow.
        let entries = build_live_entries(vec![reading("A", 10, 0, 500, 0)]);
        assert_eq!(entries[0].weekly_delta, "0");
    }

    #[test]
    fn missing_baseline_means_delta_equals_combined() {
        let entries = build_live_entries(vec![reading("A", 40, 2, 0, 0)]);
        assert_eq!(entries[0].weekly_delta, "42");
        assert_eq!(entries[0].monthly_delta, "42");
    }
}
