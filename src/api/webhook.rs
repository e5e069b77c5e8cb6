use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::AppState;
use crate::{
    chain::parse_address,
    constants::NEYNAR_SIGNATURE_HEADER,
    crypto::{hash::cast_id_from_hash, hmac::WebhookSigner},
    error::{AppError, Result},
};

/// Pulls the cast hash and the author's first verified Ethereum address out
/// of a `cast.created` event. Returns None when either is missing, which is
/// a normal occurrence for authors without a verified wallet.
pub fn extract_cast_fields(event: &Value) -> Option<(String, String)> {
    let data = event.get("data")?;
    let cast_hash = data.get("hash")?.as_str()?.to_string();
    let eth_address = data
        .get("author")?
        .get("verified_addresses")?
        .get("eth_addresses")?
        .as_array()?
        .first()?
        .as_str()?
        .to_string();
    Some((cast_hash, eth_address))
}

/// POST /api/neynar-cast - Neynar webhook for new casts.
///
/// The signature covers the raw request body, so the handler takes `Bytes`
/// and only parses JSON after verification passes.
pub async fn neynar_cast(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let signature = headers
        .get(NEYNAR_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::InvalidSignature)?;

    let signer = WebhookSigner::new(&state.config.webhook_secret);
    signer.verify(&body, signature)?;

    let event: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {}", e)))?;

    let Some((cast_hash, eth_address)) = extract_cast_fields(&event) else {
        tracing::debug!("Cast event without a verified address; ignoring");
        return Ok(Json(json!({ "success": true, "registered": false })));
    };

    let author = parse_address(&eth_address)?;
    let cast_id = cast_id_from_hash(&cast_hash);

    // An author re-posting the same hash reverts on chain; the webhook still
    // acknowledges so Neynar does not retry forever.
    match state.chain.register_cast(author, cast_id).await {
        Ok(tx_hash) => {
            tracing::info!(cast = %cast_hash, author = %eth_address, tx = %tx_hash, "cast registered");
        }
        Err(e) => {
            tracing::warn!(cast = %cast_hash, error = %e, "cast registration failed");
            return Ok(Json(json!({ "success": true, "registered": false })));
        }
    }

    // The cast is already registered on chain at this point; losing the row
    // only means the poller won't revisit this cast.
    if let Err(e) = state.db.insert_submission(&cast_hash, &eth_address).await {
        tracing::error!(cast = %cast_hash, error = %e, "failed to record submission");
    }

    Ok(Json(json!({ "success": true, "registered": true })))
}

#[derive(Deserialize)]
pub struct SignCastRequest {
    pub hash: String,
    #[serde(rename = "ethAddress")]
    pub eth_address: String,
}

#[derive(Serialize)]
pub struct SignCastResponse {
    pub signature: String,
}

// Serialized shape must match what the webhook handler verifies, so the
// payload is a fixed struct rather than ad-hoc json!.
#[derive(Serialize)]
struct SignedCastPayload {
    data: SignedCastData,
}

#[derive(Serialize)]
struct SignedCastData {
    hash: String,
    author: SignedCastAuthor,
}

#[derive(Serialize)]
struct SignedCastAuthor {
    verified_addresses: SignedCastAddresses,
}

#[derive(Serialize)]
struct SignedCastAddresses {
    eth_addresses: Vec<String>,
}

/// POST /api/sign-cast - signs a synthetic cast event for clients that
/// relay their own casts instead of waiting for the webhook.
pub async fn sign_cast(
    State(state): State<AppState>,
    Json(req): Json<SignCastRequest>,
) -> Result<Json<SignCastResponse>> {
    parse_address(&req.eth_address)?;

    let payload = SignedCastPayload {
        data: SignedCastData {
            hash: req.hash,
            author: SignedCastAuthor {
                verified_addresses: SignedCastAddresses {
                    eth_addresses: vec![req.eth_address],
                },
            },
        },
    };
    let body = serde_json::to_vec(&payload)
        .map_err(|e| AppError::Internal(format!("Payload serialization failed: {}", e)))?;

    let signer = WebhookSigner::new(&state.config.webhook_secret);
    Ok(Json(SignCastResponse {
        signature: signer.sign(&body),
    }))
}
