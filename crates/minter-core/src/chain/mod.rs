//! Wallet and contract access seam.
//!
//! The minting workflow never touches a provider directly; it is handed a
//! [`ChainClient`] capability. Runtime transports implement the trait as
//! adapters: [`mock_client::MockChainClient`] for tests and offline smoke
//! paths, [`ethers_client::EthersChainClient`] (feature `chain-ethers`)
//! for real RPC endpoints.

pub mod mock_client;

#[cfg(feature = "chain-ethers")]
pub mod ethers_client;

use crate::types::{TokenUri, TxId, WalletAddress};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ChainClientError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("signature rejected: {0}")]
    Rejected(String),
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("contract reverted: {0}")]
    Reverted(String),
    #[error("confirmation timed out: {0}")]
    Timeout(String),
    #[error("decode error: {0}")]
    Decode(String),
}

/// A submitted but not yet confirmed mint transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMint {
    pub tx_id: TxId,
}

/// Confirmed inclusion of a mint transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    pub tx_id: TxId,
    pub block_number: u64,
    /// Minted token id when the transport can recover it from the receipt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<u64>,
}

/// Wallet-bound view of the token and badge contracts.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address of the connected signer.
    async fn wallet_address(&self) -> Result<WalletAddress, ChainClientError>;

    async fn chain_id(&self) -> Result<u64, ChainClientError>;

    /// `balanceOf(owner)` on the token contract.
    async fn balance_of(&self, owner: &WalletAddress) -> Result<u64, ChainClientError>;

    /// `hasClaimed(owner, tierId)` on the badge contract.
    async fn has_claimed(
        &self,
        owner: &WalletAddress,
        tier_id: u64,
    ) -> Result<bool, ChainClientError>;

    /// Submit `safeMint(recipient, tokenUri)`. Returns as soon as the
    /// wallet has signed and the transaction id is known.
    async fn submit_mint(
        &self,
        recipient: &WalletAddress,
        token_uri: &TokenUri,
    ) -> Result<PendingMint, ChainClientError>;

    /// Block (cooperatively) until the transaction reaches the requested
    /// confirmation depth. No pipeline-imposed deadline: the transport's
    /// own timeout behavior governs how long this can take.
    async fn await_confirmation(
        &self,
        pending: &PendingMint,
        confirmations: u32,
    ) -> Result<MintReceipt, ChainClientError>;

    /// `tokenURI(tokenId)` on the token contract.
    async fn token_uri(&self, token_id: u64) -> Result<TokenUri, ChainClientError>;

    /// `ownerOf(tokenId)` on the token contract.
    async fn owner_of(&self, token_id: u64) -> Result<WalletAddress, ChainClientError>;
}

/// Daily check-in contract access.
#[async_trait]
pub trait CheckInClient: Send + Sync {
    /// Unix seconds of the owner's last check-in, 0 if never.
    async fn last_check_in(&self, owner: &WalletAddress) -> Result<u64, ChainClientError>;

    /// Submit `checkIn()` and wait for its confirmation.
    async fn check_in(&self) -> Result<TxId, ChainClientError>;
}
