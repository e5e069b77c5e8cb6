pub mod farcaster;
pub mod game;
pub mod health;
pub mod leaderboard;
pub mod webhook;

use std::sync::Arc;

use crate::chain::ChainClient;
use crate::config::Config;
use crate::db::Database;
use crate::neynar::NeynarClient;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
    pub chain: Arc<ChainClient>,
    pub neynar: Arc<NeynarClient>,
}
