use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::AppState;
use crate::{
    chain::parse_address,
    error::Result,
    models::ApiResponse,
    services::multiplier::{bucket_multiplier, damage_multiplier},
};

#[derive(Deserialize)]
pub struct ClaimRequest {
    pub address: String,
}

/// POST /api/claim-accumulated - pushes a player's accumulated damage into
/// their total via the bot wallet.
pub async fn claim_accumulated(
    State(state): State<AppState>,
    Json(req): Json<ClaimRequest>,
) -> Result<Json<Value>> {
    let player = parse_address(&req.address)?;
    let tx_hash = state.chain.apply_damage(player).await?;

    tracing::info!(player = %req.address, tx = %tx_hash, "accumulated damage claimed");

    Ok(Json(json!({ "success": true, "tx_hash": tx_hash })))
}

#[derive(Serialize)]
pub struct MultiplierResponse {
    pub address: String,
    pub tx_count: u64,
    pub follower_count: u64,
    pub nft_count: u64,
    pub tx_multiplier: f64,
    pub follower_multiplier: f64,
    pub nft_multiplier: f64,
    pub total_multiplier: f64,
}

/// GET /api/multiplier/{address} - breaks down the damage multiplier the
/// contract-side bot applies for a player.
pub async fn get_multiplier(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<MultiplierResponse>>> {
    let player = parse_address(&address)?;

    let tx_count = state.chain.transaction_count(player).await?;
    let nft_count = state.chain.featured_nft_balance(player).await?;

    // Followers come from Neynar; a wallet without a Farcaster account just
    // contributes nothing on that axis.
    let follower_count = match state.neynar.follower_count(&address).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(address = %address, error = %e, "follower lookup failed");
            0
        }
    };

    let nft_multiplier = crate::constants::MULTIPLIER_PER_FEATURED_NFT * nft_count as f64;

    Ok(Json(ApiResponse::success(MultiplierResponse {
        address,
        tx_count,
        follower_count,
        nft_count,
        tx_multiplier: bucket_multiplier(tx_count),
        follower_multiplier: bucket_multiplier(follower_count),
        nft_multiplier,
        total_multiplier: damage_multiplier(tx_count, follower_count, nft_count),
    })))
}
