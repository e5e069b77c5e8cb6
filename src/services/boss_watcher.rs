use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{interval, Duration};

use crate::{
    chain::ChainClient,
    constants::{BOSS_SPAWN_PERIOD_SECS, BOSS_WATCH_INTERVAL_SECS},
    error::Result,
};

/// A new boss is due once the spawn period has fully elapsed; a zero
/// timestamp means no boss has ever been spawned.
pub fn spawn_due(last_spawn_secs: u64, now_secs: u64) -> bool {
    last_spawn_secs == 0 || now_secs.saturating_sub(last_spawn_secs) > BOSS_SPAWN_PERIOD_SECS
}

/// Boss Watcher - keeps the 12-hour boss rotation moving when no player
/// transaction has triggered a spawn.
pub struct BossWatcher {
    chain: Arc<ChainClient>,
    running: Mutex<()>,
}

impl BossWatcher {
    pub fn new(chain: Arc<ChainClient>) -> Self {
        Self {
            chain,
            running: Mutex::new(()),
        }
    }

    pub async fn start(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(BOSS_WATCH_INTERVAL_SECS));

            loop {
                ticker.tick().await;

                let Ok(_guard) = self.running.try_lock() else {
                    continue;
                };

                if let Err(e) = self.check_and_spawn().await {
                    tracing::error!("Boss watcher error: {}", e);
                }
            }
        });
    }

    async fn check_and_spawn(&self) -> Result<()> {
        let last_spawn = self.chain.last_boss_spawn().await?;
        let now = chrono::Utc::now().timestamp().max(0) as u64;

        if !spawn_due(last_spawn, now) {
            return Ok(());
        }

        let tx_hash = self.chain.spawn_boss().await?;
        let (health, max_health) = self.chain.boss_health().await?;
        tracing::info!(
            tx = %tx_hash,
            health = %health,
            max_health = %max_health,
            "boss spawned"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_spawn_is_always_due() {
        assert!(spawn_due(0, 1_700_000_000));
    }

    #[test]
    fn spawn_waits_out_the_full_period() {
        let last = 1_700_000_000u64;
        assert!(!spawn_due(last, last + BOSS_SPAWN_PERIOD_SECS));
        assert!(spawn_due(last, last + BOSS_SPAWN_PERIOD_SECS + 1));
    }

    #[test]
    fn clock_skew_does_not_underflow() {
        assert!(!spawn_due(1_700_000_000, 1_600_000_000));
    }
}
