use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::Value;

use super::AppState;
use crate::error::Result;

// Thin proxies over Neynar's Sign In With Neynar endpoints. The frontend
// cannot call Neynar directly without exposing the API key.

pub async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    let response = state.neynar.siwn_post("sign-in", body).await?;
    Ok(Json(response))
}

pub async fn sign_in_status(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>> {
    let query: Vec<(String, String)> = params.into_iter().collect();
    let response = state.neynar.siwn_get("sign-in", &query).await?;
    Ok(Json(response))
}

pub async fn verify(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    let response = state.neynar.siwn_post("verify", body).await?;
    Ok(Json(response))
}

pub async fn verify_status(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>> {
    let query: Vec<(String, String)> = params.into_iter().collect();
    let response = state.neynar.siwn_get("verify", &query).await?;
    Ok(Json(response))
}
