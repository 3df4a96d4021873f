//! EVM adapter for the chain client seam.
//!
//! Binds the token, badge and check-in contracts to a `Provider<Http>`
//! behind a local signer. Construction verifies the endpoint's chain id
//! against the configured one and refuses to proceed on a mismatch, so a
//! wallet pointed at the wrong network fails fast instead of submitting.

use super::{ChainClient, ChainClientError, CheckInClient, MintReceipt, PendingMint};
use crate::types::{TokenUri, TxId, WalletAddress};
use async_trait::async_trait;
use ethers::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

abigen!(
    GenesisToken,
    r#"[
        function safeMint(address to, string tokenURI)
        function tokenURI(uint256 tokenId) view returns (string)
        function ownerOf(uint256 tokenId) view returns (address)
        function balanceOf(address owner) view returns (uint256)
        function hasClaimed(address user, uint256 badgeId) view returns (bool)
    ]"#
);

abigen!(
    DailyCheckIn,
    r#"[
        function checkIn()
        function getLastCheckIn(address user) view returns (uint256)
    ]"#
);

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Connection settings for the EVM adapter.
#[derive(Debug, Clone, Deserialize)]
pub struct EthersChainConfig {
    pub rpc_url: String,
    /// Expected chain id; construction fails if the endpoint disagrees.
    pub chain_id: u64,
    pub token_contract: String,
    pub badge_contract: String,
    #[serde(default)]
    pub checkin_contract: Option<String>,
    /// Receipt polling cadence while waiting for confirmations.
    #[serde(default = "default_poll_ms")]
    pub confirmation_poll_ms: u64,
}

fn default_poll_ms() -> u64 {
    2_000
}

pub struct EthersChainClient {
    wallet: WalletAddress,
    chain_id: u64,
    client: Arc<SignerClient>,
    token: GenesisToken<SignerClient>,
    badge: GenesisToken<SignerClient>,
    checkin: Option<DailyCheckIn<SignerClient>>,
    poll_interval: Duration,
}

impl EthersChainClient {
    /// Connects, verifies the chain id, and binds the contracts.
    pub async fn connect(
        cfg: &EthersChainConfig,
        private_key: &str,
    ) -> Result<Self, ChainClientError> {
        if cfg.rpc_url.trim().is_empty() {
            return Err(ChainClientError::Config("chain.rpc_url is empty".to_string()));
        }

        let provider = Provider::<Http>::try_from(cfg.rpc_url.clone())
            .map_err(|e| ChainClientError::Config(format!("invalid rpc url: {e}")))?;

        let reported = provider
            .get_chainid()
            .await
            .map_err(|e| ChainClientError::Network(e.to_string()))?;
        if reported != U256::from(cfg.chain_id) {
            return Err(ChainClientError::Config(format!(
                "endpoint reports chain id {reported}, expected {}",
                cfg.chain_id
            )));
        }

        let signer: LocalWallet = private_key
            .parse::<LocalWallet>()
            .map_err(|e| ChainClientError::Config(format!("invalid private key: {e}")))?
            .with_chain_id(cfg.chain_id);
        let wallet = WalletAddress::new(format!("{:#x}", signer.address()));

        let client = Arc::new(SignerMiddleware::new(provider, signer));

        let token_addr = parse_address(&cfg.token_contract, "chain.token_contract")?;
        let badge_addr = parse_address(&cfg.badge_contract, "chain.badge_contract")?;
        let checkin = match cfg.checkin_contract.as_deref().map(str::trim) {
            Some(addr) if !addr.is_empty() => Some(DailyCheckIn::new(
                parse_address(addr, "chain.checkin_contract")?,
                Arc::clone(&client),
            )),
            _ => None,
        };

        Ok(Self {
            wallet,
            chain_id: cfg.chain_id,
            token: GenesisToken::new(token_addr, Arc::clone(&client)),
            badge: GenesisToken::new(badge_addr, Arc::clone(&client)),
            checkin,
            client,
            poll_interval: Duration::from_millis(cfg.confirmation_poll_ms.max(100)),
        })
    }

    fn checkin_contract(&self) -> Result<&DailyCheckIn<SignerClient>, ChainClientError> {
        self.checkin.as_ref().ok_or_else(|| {
            ChainClientError::Config("chain.checkin_contract is not configured".to_string())
        })
    }
}

fn parse_address(raw: &str, field: &str) -> Result<Address, ChainClientError> {
    raw.trim()
        .parse::<Address>()
        .map_err(|e| ChainClientError::Config(format!("invalid {field}: {e}")))
}

fn parse_wallet(addr: &WalletAddress) -> Result<Address, ChainClientError> {
    addr.as_str()
        .parse::<Address>()
        .map_err(|e| ChainClientError::Decode(format!("invalid address {addr}: {e}")))
}

fn clamp_u64(v: U256) -> u64 {
    if v > U256::from(u64::MAX) {
        u64::MAX
    } else {
        v.as_u64()
    }
}

/// Maps a contract send error onto the failure taxonomy, keeping the
/// underlying message intact.
fn classify_send_error(message: String) -> ChainClientError {
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("insufficient funds") {
        ChainClientError::InsufficientFunds(message)
    } else if lowered.contains("denied") || lowered.contains("rejected") {
        ChainClientError::Rejected(message)
    } else if lowered.contains("revert") {
        ChainClientError::Reverted(message)
    } else {
        ChainClientError::Network(message)
    }
}

#[async_trait]
impl ChainClient for EthersChainClient {
    async fn wallet_address(&self) -> Result<WalletAddress, ChainClientError> {
        Ok(self.wallet.clone())
    }

    async fn chain_id(&self) -> Result<u64, ChainClientError> {
        Ok(self.chain_id)
    }

    async fn balance_of(&self, owner: &WalletAddress) -> Result<u64, ChainClientError> {
        let balance = self
            .token
            .balance_of(parse_wallet(owner)?)
            .call()
            .await
            .map_err(|e| ChainClientError::Network(e.to_string()))?;
        Ok(clamp_u64(balance))
    }

    async fn has_claimed(
        &self,
        owner: &WalletAddress,
        tier_id: u64,
    ) -> Result<bool, ChainClientError> {
        self.badge
            .has_claimed(parse_wallet(owner)?, U256::from(tier_id))
            .call()
            .await
            .map_err(|e| ChainClientError::Network(e.to_string()))
    }

    async fn submit_mint(
        &self,
        recipient: &WalletAddress,
        token_uri: &TokenUri,
    ) -> Result<PendingMint, ChainClientError> {
        let call = self
            .token
            .safe_mint(parse_wallet(recipient)?, token_uri.0.clone());
        let pending = call
            .send()
            .await
            .map_err(|e| classify_send_error(e.to_string()))?;
        let tx_hash = pending.tx_hash();
        Ok(PendingMint {
            tx_id: TxId(format!("{tx_hash:#x}")),
        })
    }

    async fn await_confirmation(
        &self,
        pending: &PendingMint,
        confirmations: u32,
    ) -> Result<MintReceipt, ChainClientError> {
        let hash: TxHash = pending
            .tx_id
            .0
            .parse()
            .map_err(|e| ChainClientError::Decode(format!("invalid tx id: {e}")))?;

        // Poll the receipt until the requested depth is reached. The RPC
        // transport's own timeout governs each request; there is no
        // additional deadline here.
        loop {
            if let Some(receipt) = self
                .client
                .get_transaction_receipt(hash)
                .await
                .map_err(|e| ChainClientError::Network(e.to_string()))?
            {
                if receipt.status == Some(0u64.into()) {
                    return Err(ChainClientError::Reverted(format!(
                        "transaction {} reverted",
                        pending.tx_id
                    )));
                }
                if let Some(included) = receipt.block_number {
                    let head = self
                        .client
                        .get_block_number()
                        .await
                        .map_err(|e| ChainClientError::Network(e.to_string()))?;
                    let depth = head.as_u64().saturating_sub(included.as_u64()) + 1;
                    if depth >= u64::from(confirmations.max(1)) {
                        return Ok(MintReceipt {
                            tx_id: pending.tx_id.clone(),
                            block_number: included.as_u64(),
                            token_id: None,
                        });
                    }
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn token_uri(&self, token_id: u64) -> Result<TokenUri, ChainClientError> {
        let uri = self
            .token
            .token_uri(U256::from(token_id))
            .call()
            .await
            .map_err(|e| ChainClientError::Network(e.to_string()))?;
        Ok(TokenUri(uri))
    }

    async fn owner_of(&self, token_id: u64) -> Result<WalletAddress, ChainClientError> {
        let owner = self
            .token
            .owner_of(U256::from(token_id))
            .call()
            .await
            .map_err(|e| ChainClientError::Network(e.to_string()))?;
        Ok(WalletAddress::new(format!("{owner:#x}")))
    }
}

#[async_trait]
impl CheckInClient for EthersChainClient {
    async fn last_check_in(&self, owner: &WalletAddress) -> Result<u64, ChainClientError> {
        let ts = self
            .checkin_contract()?
            .get_last_check_in(parse_wallet(owner)?)
            .call()
            .await
            .map_err(|e| ChainClientError::Network(e.to_string()))?;
        Ok(clamp_u64(ts))
    }

    async fn check_in(&self) -> Result<TxId, ChainClientError> {
        let call = self.checkin_contract()?.check_in();
        let pending = call
            .send()
            .await
            .map_err(|e| classify_send_error(e.to_string()))?;
        let receipt = pending
            .await
            .map_err(|e| ChainClientError::Network(e.to_string()))?
            .ok_or_else(|| {
                ChainClientError::Timeout("transaction dropped from mempool".to_string())
            })?;
        Ok(TxId(format!("{:#x}", receipt.transaction_hash)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_errors_map_onto_the_taxonomy() {
        assert!(matches!(
            classify_send_error("insufficient funds for gas".to_string()),
            ChainClientError::InsufficientFunds(_)
        ));
        assert!(matches!(
            classify_send_error("MetaMask Tx Signature: User denied".to_string()),
            ChainClientError::Rejected(_)
        ));
        assert!(matches!(
            classify_send_error("execution reverted: already claimed".to_string()),
            ChainClientError::Reverted(_)
        ));
        assert!(matches!(
            classify_send_error("connection reset".to_string()),
            ChainClientError::Network(_)
        ));
    }

    #[test]
    fn u256_clamp_saturates() {
        assert_eq!(clamp_u64(U256::from(7u64)), 7);
        assert_eq!(clamp_u64(U256::MAX), u64::MAX);
    }
}
