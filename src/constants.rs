/// Application constants

// Webhook / Neynar
pub const NEYNAR_SIGNATURE_HEADER: &str = "x-neynar-signature";
pub const NEYNAR_DEFAULT_API_URL: &str = "https://api.neynar.com";

// Background job intervals (seconds)
pub const ENGAGEMENT_POLL_INTERVAL_SECS: u64 = 300; // 5 minutes
pub const SNAPSHOT_CHECK_INTERVAL_SECS: u64 = 21_600; // 6 hours
pub const BOSS_WATCH_INTERVAL_SECS: u64 = 300;

// Snapshot cadence, measured against the latest stored snapshot_time
pub const WEEKLY_SNAPSHOT_PERIOD_SECS: i64 = 7 * 24 * 3600;
pub const MONTHLY_SNAPSHOT_PERIOD_SECS: i64 = 30 * 24 * 3600;

// Boss spawn cadence
pub const BOSS_SPAWN_PERIOD_SECS: u64 = 12 * 3600;

// Poller scope: only the newest submissions are re-polled
pub const POLLED_SUBMISSIONS_LIMIT: i64 = 50;

// Leaderboard sizes
pub const WEEKLY_LEADERBOARD_SIZE: i64 = 10;
pub const MONTHLY_LEADERBOARD_SIZE: i64 = 3;

// Damage multiplier ladder: (inclusive lower bound, contribution).
// Applied to both transaction count and follower count.
pub const MULTIPLIER_BUCKETS: [(u64, f64); 6] = [
    (0, 0.0),
    (1, 0.2),
    (11, 0.4),
    (21, 0.6),
    (41, 0.8),
    (101, 1.2),
];

// Each featured NFT held adds a flat contribution
pub const MULTIPLIER_PER_FEATURED_NFT: f64 = 0.5;

// Outbound HTTP
pub const HTTP_TIMEOUT_SECS: u64 = 10;
