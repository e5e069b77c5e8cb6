use std::sync::Arc;

use ethers::contract::abigen;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, U256};

use crate::{
    config::Config,
    error::{AppError, Result},
};

abigen!(
    DamageGame,
    r#"[
        function registerCast(address user, uint256 castId)
        function recordCastEngagement(address engager, uint256 castId)
        function applyDamage(address user)
        function spawnBoss()
        function fetchUserStats(address user) view returns (uint256 totalDamage, uint256 accumulatedDamage, uint256 lastStakeTime, uint256 castCountToday)
        function bossHealth() view returns (uint256)
        function bossMaxHealth() view returns (uint256)
        function lastBossSpawn() view returns (uint256)
    ]"#
);

abigen!(
    FeaturedNft,
    r#"[
        function balanceOf(address owner) view returns (uint256)
    ]"#
);

type BotMiddleware = SignerMiddleware<Provider<Http>, LocalWallet>;

/// On-chain user record as read from `fetchUserStats`. Only the two damage
/// fields feed the leaderboards; the cooldown fields are carried through for
/// completeness.
#[derive(Debug, Clone, Copy)]
pub struct UserStats {
    pub total_damage: U256,
    pub accumulated_damage: U256,
    pub last_stake_time: U256,
    pub cast_count_today: U256,
}

impl UserStats {
    /// Combined damage score: total + accumulated, arbitrary precision.
    pub fn combined_damage(&self) -> U256 {
        self.total_damage.saturating_add(self.accumulated_damage)
    }
}

/// DamageGame contract handle. Writes go through the bot signer and block
/// until one confirmation; reads use the underlying provider.
pub struct ChainClient {
    contract: DamageGame<BotMiddleware>,
    nft: Option<FeaturedNft<Provider<Http>>>,
    provider: Arc<Provider<Http>>,
}

impl ChainClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| AppError::Internal(format!("Invalid RPC URL: {}", e)))?;
        let provider = Arc::new(provider);

        let wallet: LocalWallet = config
            .bot_private_key
            .trim_start_matches("0x")
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid bot private key: {}", e)))?;
        let wallet = wallet.with_chain_id(config.chain_id);

        let client = Arc::new(SignerMiddleware::new((*provider).clone(), wallet));

        let contract_address = parse_address(&config.contract_address)?;
        let contract = DamageGame::new(contract_address, client);

        let nft = match parse_address(&config.featured_nft_address) {
            Ok(addr) if addr != Address::zero() => {
                Some(FeaturedNft::new(addr, provider.clone()))
            }
            _ => None,
        };

        Ok(Self {
            contract,
            nft,
            provider,
        })
    }

    // ==================== WRITES ====================

    pub async fn register_cast(&self, user: Address, cast_id: U256) -> Result<String> {
        let call = self.contract.register_cast(user, cast_id);
        Self::send_and_confirm(call).await
    }

    pub async fn record_engagement(&self, engager: Address, cast_id: U256) -> Result<String> {
        let call = self.contract.record_cast_engagement(engager, cast_id);
        Self::send_and_confirm(call).await
    }

    pub async fn apply_damage(&self, user: Address) -> Result<String> {
        let call = self.contract.apply_damage(user);
        Self::send_and_confirm(call).await
    }

    pub async fn spawn_boss(&self) -> Result<String> {
        let call = self.contract.spawn_boss();
        Self::send_and_confirm(call).await
    }

    async fn send_and_confirm(
        call: ethers::contract::ContractCall<BotMiddleware, ()>,
    ) -> Result<String> {
        let pending = call
            .send()
            .await
            .map_err(|e| AppError::ChainRpc(e.to_string()))?;
        let receipt = pending
            .await
            .map_err(|e| AppError::ChainRpc(e.to_string()))?;
        let tx_hash = receipt
            .map(|r| format!("{:#x}", r.transaction_hash))
            .unwrap_or_default();
        Ok(tx_hash)
    }

    // ==================== READS ====================

    pub async fn fetch_user_stats(&self, user: Address) -> Result<UserStats> {
        let (total_damage, accumulated_damage, last_stake_time, cast_count_today) = self
            .contract
            .fetch_user_stats(user)
            .call()
            .await
            .map_err(|e| AppError::ChainRpc(e.to_string()))?;

        Ok(UserStats {
            total_damage,
            accumulated_damage,
            last_stake_time,
            cast_count_today,
        })
    }

    pub async fn boss_health(&self) -> Result<(U256, U256)> {
        let health = self
            .contract
            .boss_health()
            .call()
            .await
            .map_err(|e| AppError::ChainRpc(e.to_string()))?;
        let max_health = self
            .contract
            .boss_max_health()
            .call()
            .await
            .map_err(|e| AppError::ChainRpc(e.to_string()))?;
        Ok((health, max_health))
    }

    pub async fn last_boss_spawn(&self) -> Result<u64> {
        let raw = self
            .contract
            .last_boss_spawn()
            .call()
            .await
            .map_err(|e| AppError::ChainRpc(e.to_string()))?;
        Ok(u256_to_u64(raw))
    }

    pub async fn transaction_count(&self, user: Address) -> Result<u64> {
        let count = self
            .provider
            .get_transaction_count(user, None)
            .await
            .map_err(|e| AppError::ChainRpc(e.to_string()))?;
        Ok(u256_to_u64(count))
    }

    pub async fn featured_nft_balance(&self, user: Address) -> Result<u64> {
        let Some(nft) = &self.nft else {
            return Ok(0);
        };
        let balance = nft
            .balance_of(user)
            .call()
            .await
            .map_err(|e| AppError::ChainRpc(e.to_string()))?;
        Ok(u256_to_u64(balance))
    }
}

pub fn parse_address(value: &str) -> Result<Address> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|_| AppError::BadRequest(format!("Invalid address: {}", value)))
}

/// Clamping u256 -> u64 for timestamps and small counters.
fn u256_to_u64(value: U256) -> u64 {
    if value > U256::from(u64::MAX) {
        u64::MAX
    } else {
        value.as_u64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_address_accepts_checksummed_and_lowercase() {
        assert!(parse_address("0x3638D6aC0EC8081d6241DF9Dd95Da6c1BcF9d538").is_ok());
        assert!(parse_address("0xd9f016e453de48d877e3f199e8fa4aadca2e979c").is_ok());
    }

    #[test]
    fn parse_address_rejects_garbage() {
        assert!(parse_address("").is_err());
        assert!(parse_address("0x123").is_err());
        assert!(parse_address("not-an-address").is_err());
    }

    #[test]
    fn combined_damage_uses_arbitrary_precision() {
        let stats = UserStats {
            total_damage: U256::from(u128::MAX),
            accumulated_damage: U256::one(),
            last_stake_time: U256::zero(),
            cast_count_today: U256::zero(),
        };
        assert_eq!(
            stats.combined_damage().to_string(),
            "340282366920938463463374607431768211456"
        );
    }

    #[test]
    fn u256_to_u64_clamps_oversized_values() {
        assert_eq!(u256_to_u64(U256::from(42u64)), 42);
        assert_eq!(u256_to_u64(U256::MAX), u64::MAX);
    }
}
