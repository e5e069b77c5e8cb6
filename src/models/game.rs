use chrono::{DateTime, Utc};
use ethers::types::U256;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ==================== SUBMISSIONS ====================
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CastSubmission {
    pub cast_hash: String,
    pub eth_address: String,
    pub created_at: DateTime<Utc>,
}

// ==================== SNAPSHOTS ====================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotPeriod {
    Weekly,
    Monthly,
}

impl SnapshotPeriod {
    pub fn table(&self) -> &'static str {
        match self {
            SnapshotPeriod::Weekly => "weekly_snapshots",
            SnapshotPeriod::Monthly => "monthly_snapshots",
        }
    }

    pub fn period_secs(&self) -> i64 {
        match self {
            SnapshotPeriod::Weekly => crate::constants::WEEKLY_SNAPSHOT_PERIOD_SECS,
            SnapshotPeriod::Monthly => crate::constants::MONTHLY_SNAPSHOT_PERIOD_SECS,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SnapshotPeriod::Weekly => "weekly",
            SnapshotPeriod::Monthly => "monthly",
        }
    }
}

/// Stored snapshot row. Damage values are uint256 on chain, kept as decimal
/// strings so they survive the round trip without truncation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SnapshotRow {
    pub rank: i32,
    pub eth_address: String,
    pub total_damage: String,
    pub accumulated_damage: String,
    pub snapshot_time: DateTime<Utc>,
}

impl SnapshotRow {
    pub fn combined_damage(&self) -> U256 {
        parse_damage(&self.total_damage).saturating_add(parse_damage(&self.accumulated_damage))
    }
}

/// Snapshot leaderboard entry as served to the frontend.
#[derive(Debug, Serialize)]
pub struct SnapshotEntry {
    pub rank: i32,
    pub address: String,
    pub total_damage: String,
    pub accumulated_damage: String,
    pub combined_damage: String,
    pub snapshot_time: DateTime<Utc>,
}

impl From<SnapshotRow> for SnapshotEntry {
    fn from(row: SnapshotRow) -> Self {
        let combined = row.combined_damage();
        SnapshotEntry {
            rank: row.rank,
            address: row.eth_address,
            total_damage: row.total_damage,
            accumulated_damage: row.accumulated_damage,
            combined_damage: combined.to_string(),
            snapshot_time: row.snapshot_time,
        }
    }
}

// ==================== LIVE LEADERBOARD ====================
#[derive(Debug, Serialize)]
pub struct LiveEntry {
    pub rank: i32,
    pub address: String,
    pub total_damage: String,
    pub accumulated_damage: String,
    pub combined_damage: String,
    pub weekly_delta: String,
    pub monthly_delta: String,
}

#[derive(Debug, Serialize)]
pub struct LiveLeaderboardResponse {
    pub weekly: Vec<LiveEntry>,
}

// ==================== API RESPONSE ====================
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Parses a stored decimal damage string. Rows are written by this service,
/// so a malformed value is treated as zero rather than poisoning a whole
/// leaderboard response.
pub fn parse_damage(value: &str) -> U256 {
    U256::from_dec_str(value.trim()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn api_response_success_sets_flag() {
        let response = ApiResponse::success("ok");
        assert!(response.success);
        assert_eq!(response.data, "ok");
    }

    #[test]
    fn combined_damage_adds_beyond_native_range() {
        let row = SnapshotRow {
            rank: 1,
            eth_address: "0xabc".to_string(),
            // u128::MAX, so the sum only fits in a wider integer
            total_damage: "340282366920938463463374607431768211455".to_string(),
            accumulated_damage: "1".to_string(),
            snapshot_time: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };
        assert_eq!(
            row.combined_damage().to_string(),
            "340282366920938463463374607431768211456"
        );
    }

    #[test]
    fn parse_damage_defaults_to_zero_on_garbage() {
        assert_eq!(parse_damage("not-a-number"), U256::zero());
        assert_eq!(parse_damage(" 42 "), U256::from(42u64));
    }

    #[test]
    fn snapshot_entry_carries_combined_string() {
        let row = SnapshotRow {
            rank: 2,
            eth_address: "0xdef".to_string(),
            total_damage: "100".to_string(),
            accumulated_damage: "50".to_string(),
            snapshot_time: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };
        let entry = SnapshotEntry::from(row);
        assert_eq!(entry.combined_damage, "150");
        assert_eq!(entry.address, "0xdef");
    }

    #[test]
    fn snapshot_period_tables_are_distinct() {
        assert_eq!(SnapshotPeriod::Weekly.table(), "weekly_snapshots");
        assert_eq!(SnapshotPeriod::Monthly.table(), "monthly_snapshots");
        assert!(SnapshotPeriod::Monthly.period_secs() > SnapshotPeriod::Weekly.period_secs());
    }
}
