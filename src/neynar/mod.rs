use std::time::Duration;

use serde_json::Value;

use crate::{
    config::Config,
    constants::HTTP_TIMEOUT_SECS,
    error::{AppError, Result},
};

/// The three engagement kinds the poller credits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementKind {
    Like,
    Reply,
    Recast,
}

impl EngagementKind {
    pub const ALL: [EngagementKind; 3] = [
        EngagementKind::Like,
        EngagementKind::Reply,
        EngagementKind::Recast,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EngagementKind::Like => "like",
            EngagementKind::Reply => "reply",
            EngagementKind::Recast => "recast",
        }
    }

    fn reaction_type(&self) -> Option<&'static str> {
        match self {
            EngagementKind::Like => Some("likes"),
            EngagementKind::Recast => Some("recasts"),
            EngagementKind::Reply => None,
        }
    }
}

/// Thin client for the Neynar Farcaster API: engagement lookups for the
/// poller, follower counts for the multiplier, and SIWN pass-through for the
/// frontend sign-in flow.
pub struct NeynarClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl NeynarClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key: config.neynar_api_key.clone(),
            base_url: config.neynar_api_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value> {
        let response = self
            .http
            .get(url)
            .query(query)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::NeynarApi(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::NeynarApi(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::NeynarApi(e.to_string()))
    }

    /// Verified ETH addresses of users who engaged with a cast, one kind at
    /// a time. Users without a verified address are skipped.
    pub async fn engagers_for_cast(
        &self,
        cast_hash: &str,
        kind: EngagementKind,
    ) -> Result<Vec<String>> {
        let payload = match kind.reaction_type() {
            Some(reaction_type) => {
                let url = format!("{}/v2/farcaster/reactions/cast", self.base_url);
                self.get_json(
                    &url,
                    &[
                        ("hash", cast_hash),
                        ("types", reaction_type),
                        ("limit", "100"),
                    ],
                )
                .await?
            }
            None => {
                let url = format!("{}/v2/farcaster/cast/conversation", self.base_url);
                self.get_json(
                    &url,
                    &[
                        ("identifier", cast_hash),
                        ("type", "hash"),
                        ("reply_depth", "1"),
                    ],
                )
                .await?
            }
        };

        Ok(extract_engager_addresses(&payload, kind))
    }

    /// Follower count of the Farcaster account verified for an ETH address;
    /// zero when no account is linked.
    pub async fn follower_count(&self, eth_address: &str) -> Result<u64> {
        let url = format!("{}/v2/farcaster/user/bulk-by-address", self.base_url);
        let payload = self
            .get_json(&url, &[("addresses", eth_address)])
            .await?;

        Ok(extract_follower_count(&payload, eth_address))
    }

    // ==================== SIWN PROXY ====================

    pub async fn siwn_post(&self, path: &str, body: Value) -> Result<Value> {
        let url = format!("{}/v2/farcaster/login/{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::NeynarApi(e.to_string()))?;

        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::NeynarApi(e.to_string()))
    }

    pub async fn siwn_get(&self, path: &str, query: &[(String, String)]) -> Result<Value> {
        let url = format!("{}/v2/farcaster/login/{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(query)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::NeynarApi(e.to_string()))?;

        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::NeynarApi(e.to_string()))
    }
}

/// Pulls the first verified ETH address out of a Neynar user object.
fn verified_eth_address(user: &Value) -> Option<String> {
    user.get("verified_addresses")?
        .get("eth_addresses")?
        .as_array()?
        .first()?
        .as_str()
        .map(str::to_string)
}

/// Walks a reactions or conversation payload and collects verified engager
/// addresses for the requested kind.
fn extract_engager_addresses(payload: &Value, kind: EngagementKind) -> Vec<String> {
    let users: Vec<&Value> = match kind {
        EngagementKind::Like | EngagementKind::Recast => payload
            .get("reactions")
            .and_then(Value::as_array)
            .map(|reactions| {
                reactions
                    .iter()
                    .filter_map(|reaction| reaction.get("user"))
                    .collect()
            })
            .unwrap_or_default(),
        EngagementKind::Reply => payload
            .get("conversation")
            .and_then(|c| c.get("cast"))
            .and_then(|c| c.get("direct_replies"))
            .and_then(Value::as_array)
            .map(|replies| {
                replies
                    .iter()
                    .filter_map(|reply| reply.get("author"))
                    .collect()
            })
            .unwrap_or_default(),
    };

    users.iter().filter_map(|u| verified_eth_address(u)).collect()
}

/// The bulk-by-address response is keyed by lowercase address.
fn extract_follower_count(payload: &Value, eth_address: &str) -> u64 {
    payload
        .get(eth_address.to_lowercase())
        .and_then(Value::as_array)
        .and_then(|users| users.first())
        .and_then(|user| user.get("follower_count"))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_like_engagers_with_verified_addresses() {
        let payload = json!({
            "reactions": [
                {"user": {"verified_addresses": {"eth_addresses": ["0xaaa"]}}},
                {"user": {"verified_addresses": {"eth_addresses": []}}},
                {"user": {}},
                {"user": {"verified_addresses": {"eth_addresses": ["0xbbb", "0xccc"]}}}
            ]
        });
        let addresses = extract_engager_addresses(&payload, EngagementKind::Like);
        assert_eq!(addresses, vec!["0xaaa".to_string(), "0xbbb".to_string()]);
    }

    #[test]
    fn extracts_reply_authors_from_conversation() {
        let payload = json!({
            "conversation": {
                "cast": {
                    "direct_replies": [
                        {"author": {"verified_addresses": {"eth_addresses": ["0xddd"]}}},
                        {"author": {"verified_addresses": {}}}
                    ]
                }
            }
        });
        let addresses = extract_engager_addresses(&payload, EngagementKind::Reply);
        assert_eq!(addresses, vec!["0xddd".to_string()]);
    }

    #[test]
    fn missing_sections_yield_empty_lists() {
        let payload = json!({});
        assert!(extract_engager_addresses(&payload, EngagementKind::Like).is_empty());
        assert!(extract_engager_addresses(&payload, EngagementKind::Reply).is_empty());
        assert!(extract_engager_addresses(&payload, EngagementKind::Recast).is_empty());
    }

    #[test]
    fn follower_count_is_keyed_by_lowercase_address() {
        let payload = json!({
            "0xabc": [{"follower_count": 120}]
        });
        assert_eq!(extract_follower_count(&payload, "0xABC"), 120);
        assert_eq!(extract_follower_count(&payload, "0xdef"), 0);
    }

    #[test]
    fn engagement_kind_labels_are_stable() {
        assert_eq!(EngagementKind::ALL.len(), 3);
        assert_eq!(EngagementKind::Like.label(), "like");
        assert_eq!(EngagementKind::Reply.label(), "reply");
        assert_eq!(EngagementKind::Recast.label(), "recast");
    }
}
