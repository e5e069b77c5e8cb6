// All service modules
pub mod boss_watcher;
pub mod engagement_poller;
pub mod multiplier;
pub mod report;
pub mod snapshot_job;

// Re-export for convenience
pub use boss_watcher::BossWatcher;
pub use engagement_poller::EngagementPoller;
pub use report::BatchReport;
pub use snapshot_job::SnapshotJob;

use crate::{chain::ChainClient, db::Database, neynar::NeynarClient};
use std::sync::Arc;

// Internal helper that checks conditions for `is_env_flag_enabled`.
fn is_env_flag_enabled(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|value| {
            let normalized = value.trim().to_ascii_lowercase();
            normalized == "1" || normalized == "true" || normalized == "yes" || normalized == "on"
        })
        .unwrap_or(false)
}

/// Start all background services
pub async fn start_background_services(
    db: Database,
    chain: Arc<ChainClient>,
    neynar: Arc<NeynarClient>,
) {
    tracing::info!("Starting background services...");

    let poller = Arc::new(EngagementPoller::new(
        db.clone(),
        chain.clone(),
        neynar.clone(),
    ));
    poller.start().await;

    let snapshot_job = Arc::new(SnapshotJob::new(db.clone(), chain.clone()));
    snapshot_job.start().await;

    // Optional: the contract also spawns bosses lazily on player writes, so
    // the watcher is only needed on quiet deployments.
    if is_env_flag_enabled("ENABLE_BOSS_WATCHER") {
        let watcher = Arc::new(BossWatcher::new(chain.clone()));
        watcher.start().await;
    } else {
        tracing::info!("Boss watcher disabled via ENABLE_BOSS_WATCHER");
    }

    tracing::info!("All background services started successfully");
}
