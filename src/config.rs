use serde::Deserialize;
use std::env;

use crate::constants::NEYNAR_DEFAULT_API_URL;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Blockchain
    pub rpc_url: String,
    pub chain_id: u64,
    pub contract_address: String,
    pub featured_nft_address: String,
    pub bot_private_key: String,

    // Neynar
    pub webhook_secret: String,
    pub neynar_api_key: String,
    pub neynar_api_url: String,

    // CORS
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            database_url: env::var("DATABASE_URL")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()?,

            rpc_url: env::var("RPC_URL")?,
            chain_id: env::var("CHAIN_ID")
                .unwrap_or_else(|_| "10143".to_string())
                .parse()?,
            contract_address: env::var("CONTRACT_ADDRESS")?,
            featured_nft_address: env::var("FEATURED_NFT_ADDRESS")
                .unwrap_or_else(|_| "0x0000000000000000000000000000000000000000".to_string()),
            bot_private_key: env::var("BOT_PRIVATE_KEY")?,

            webhook_secret: env::var("WEBHOOK_SECRET")?,
            neynar_api_key: env::var("NEYNAR_API_KEY")?,
            neynar_api_url: env::var("NEYNAR_API_URL")
                .unwrap_or_else(|_| NEYNAR_DEFAULT_API_URL.to_string()),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL is empty");
        }
        if self.rpc_url.trim().is_empty() {
            anyhow::bail!("RPC_URL is empty");
        }
        url::Url::parse(&self.rpc_url)
            .map_err(|e| anyhow::anyhow!("RPC_URL is not a valid URL: {e}"))?;
        if self.bot_private_key.trim().is_empty() {
            anyhow::bail!("BOT_PRIVATE_KEY is empty");
        }
        if self.webhook_secret.trim().is_empty() {
            anyhow::bail!("WEBHOOK_SECRET is empty");
        }
        if self.neynar_api_key.trim().is_empty() {
            anyhow::bail!("NEYNAR_API_KEY is empty");
        }

        if self.contract_address.starts_with("0x0000") {
            tracing::warn!("Using placeholder DamageGame contract address");
        }
        if self.featured_nft_address.starts_with("0x0000") {
            tracing::warn!("Featured NFT address not set; NFT multiplier reads will return 0");
        }

        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn is_testnet(&self) -> bool {
        self.environment == "development" || self.environment == "testnet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "development".to_string(),
            database_url: "postgres://localhost/nts".to_string(),
            database_max_connections: 5,
            rpc_url: "https://testnet-rpc.monad.xyz".to_string(),
            chain_id: 10143,
            contract_address: "0x3638D6aC0EC8081d6241DF9Dd95Da6c1BcF9d538".to_string(),
            featured_nft_address: "0x0000000000000000000000000000000000000000".to_string(),
            bot_private_key: "0x01".to_string(),
            webhook_secret: "secret".to_string(),
            neynar_api_key: "key".to_string(),
            neynar_api_url: NEYNAR_DEFAULT_API_URL.to_string(),
            cors_allowed_origins: "*".to_string(),
        }
    }

    #[test]
    fn validate_accepts_complete_config() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_secret() {
        let mut config = base_config();
        config.webhook_secret = "".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_rpc_url() {
        let mut config = base_config();
        config.rpc_url = "not-a-url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn testnet_detection_follows_environment() {
        let mut config = base_config();
        assert!(config.is_testnet());
        config.environment = "production".to_string();
        assert!(!config.is_testnet());
    }
}
