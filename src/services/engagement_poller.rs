use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{interval, Duration};

use crate::{
    chain::{parse_address, ChainClient},
    constants::{ENGAGEMENT_POLL_INTERVAL_SECS, POLLED_SUBMISSIONS_LIMIT},
    crypto::hash::cast_id_from_hash,
    db::Database,
    error::Result,
    neynar::{EngagementKind, NeynarClient},
    services::report::BatchReport,
};

fn poll_interval_secs() -> u64 {
    std::env::var("ENGAGEMENT_POLL_INTERVAL_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(ENGAGEMENT_POLL_INTERVAL_SECS)
}

/// Engagement Poller - re-reads recent cast submissions and credits likes,
/// replies and recasts on chain. Duplicate engagements revert in the
/// contract and land in the skip report.
pub struct EngagementPoller {
    db: Database,
    chain: Arc<ChainClient>,
    neynar: Arc<NeynarClient>,
    running: Mutex<()>,
}

impl EngagementPoller {
    pub fn new(db: Database, chain: Arc<ChainClient>, neynar: Arc<NeynarClient>) -> Self {
        Self {
            db,
            chain,
            neynar,
            running: Mutex::new(()),
        }
    }

    /// Start the polling loop. A run that outlives its interval makes the
    /// next tick skip instead of overlapping.
    pub async fn start(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(poll_interval_secs()));

            loop {
                ticker.tick().await;

                let Ok(_guard) = self.running.try_lock() else {
                    tracing::warn!("Engagement poll still in flight; skipping tick");
                    continue;
                };

                match self.poll_once().await {
                    Ok(report) => report.emit(),
                    Err(e) => tracing::error!("Engagement poller error: {}", e),
                }
            }
        });
    }

    /// One full pass over the newest submissions.
    pub async fn poll_once(&self) -> Result<BatchReport> {
        let mut report = BatchReport::new("engagement_poller");

        let submissions = self.db.recent_submissions(POLLED_SUBMISSIONS_LIMIT).await?;
        for submission in submissions {
            let cast_id = cast_id_from_hash(&submission.cast_hash);

            for kind in EngagementKind::ALL {
                let engagers = match self
                    .neynar
                    .engagers_for_cast(&submission.cast_hash, kind)
                    .await
                {
                    Ok(engagers) => engagers,
                    Err(e) => {
                        report.record_skip(
                            format!("{} {}", submission.cast_hash, kind.label()),
                            e,
                        );
                        continue;
                    }
                };

                for engager in engagers {
                    let item =
                        format!("{} {} {}", submission.cast_hash, kind.label(), engager);
                    let address = match parse_address(&engager) {
                        Ok(address) => address,
                        Err(e) => {
                            report.record_skip(item, e);
                            continue;
                        }
                    };

                    match self.chain.record_engagement(address, cast_id).await {
                        Ok(tx_hash) => {
                            tracing::debug!(
                                cast = %submission.cast_hash,
                                kind = kind.label(),
                                engager = %engager,
                                tx = %tx_hash,
                                "engagement recorded"
                            );
                            report.record_ok();
                        }
                        Err(e) => report.record_skip(item, e),
                    }
                }
            }
        }

        Ok(report)
    }
}
