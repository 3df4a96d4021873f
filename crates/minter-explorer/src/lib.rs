//! Read-only client for the block-explorer REST API.
//!
//! Two endpoint families are used: the module/action API (`txlist`,
//! `tokennfttx`) which wraps results in a status-flag envelope, and the v2
//! token API for NFT instances held by an address. All calls are
//! read-only and independent of any in-flight mint.

#![forbid(unsafe_code)]

pub mod leaderboard;

pub use leaderboard::{compute_leaderboard, LeaderboardEntry};

use minter_core::{TokenMetadata, WalletAddress};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("explorer returned http status {0}")]
    HttpStatus(u16),
    #[error("explorer rejected the query: {0}")]
    Api(String),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Offset/limit pagination for the module/action API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    /// 1-based page index.
    pub page: u64,
    /// Page size.
    pub offset: u64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            offset: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// One account transaction, as returned by `txlist`. The explorer encodes
/// numerics as strings; they are kept that way for display.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TxRecord {
    pub hash: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, rename = "timeStamp")]
    pub time_stamp: String,
    #[serde(default, rename = "blockNumber")]
    pub block_number: String,
}

/// One token transfer, as returned by `tokennfttx`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenTransfer {
    pub hash: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default, rename = "tokenID")]
    pub token_id: String,
    #[serde(default, rename = "blockNumber")]
    pub block_number: String,
}

/// One NFT instance from the v2 token API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NftInstance {
    #[serde(default)]
    pub token_id: String,
    #[serde(default)]
    pub metadata: Option<TokenMetadata>,
}

#[derive(Debug, Deserialize)]
struct ModuleEnvelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct InstancesEnvelope {
    #[serde(default)]
    items: Vec<NftInstance>,
}

/// Decodes a module/action envelope: the status flag gates the result
/// list.
fn parse_module_list<T: for<'de> Deserialize<'de>>(body: &str) -> Result<Vec<T>, ExplorerError> {
    let envelope: ModuleEnvelope =
        serde_json::from_str(body).map_err(|e| ExplorerError::Decode(e.to_string()))?;
    if envelope.status != "1" {
        return Err(ExplorerError::Api(
            envelope
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "status 0 with no message".to_string()),
        ));
    }
    serde_json::from_value(envelope.result).map_err(|e| ExplorerError::Decode(e.to_string()))
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone)]
pub struct ExplorerClient {
    cfg: ExplorerConfig,
    client: reqwest::Client,
}

impl ExplorerClient {
    pub fn new(cfg: ExplorerConfig) -> Result<Self, ExplorerError> {
        if cfg.base_url.trim().is_empty() {
            return Err(ExplorerError::Config("explorer.base_url is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| ExplorerError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self { cfg, client })
    }

    pub fn base_url(&self) -> &str {
        self.cfg.base_url.trim_end_matches('/')
    }

    async fn module_query<T: for<'de> Deserialize<'de>>(
        &self,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, ExplorerError> {
        let url = format!("{}/api", self.base_url());
        let resp = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| ExplorerError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ExplorerError::HttpStatus(status.as_u16()));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| ExplorerError::Network(e.to_string()))?;
        parse_module_list(&body)
    }

    /// Transaction list for an address.
    pub async fn transactions(
        &self,
        address: &WalletAddress,
        sort: SortOrder,
        page: PageQuery,
    ) -> Result<Vec<TxRecord>, ExplorerError> {
        self.module_query(&[
            ("module", "account".to_string()),
            ("action", "txlist".to_string()),
            ("address", address.to_string()),
            ("sort", sort.as_str().to_string()),
            ("page", page.page.to_string()),
            ("offset", page.offset.to_string()),
        ])
        .await
    }

    /// Token-transfer history for a contract.
    pub async fn token_transfers(
        &self,
        contract_address: &str,
        sort: SortOrder,
        page: PageQuery,
    ) -> Result<Vec<TokenTransfer>, ExplorerError> {
        self.module_query(&[
            ("module", "account".to_string()),
            ("action", "tokennfttx".to_string()),
            ("contractaddress", contract_address.to_string()),
            ("sort", sort.as_str().to_string()),
            ("page", page.page.to_string()),
            ("offset", page.offset.to_string()),
        ])
        .await
    }

    /// NFT instances of a contract held by an address.
    pub async fn nft_instances(
        &self,
        contract_address: &str,
        holder: &WalletAddress,
    ) -> Result<Vec<NftInstance>, ExplorerError> {
        let url = format!(
            "{}/api/v2/tokens/{}/instances",
            self.base_url(),
            contract_address
        );
        let resp = self
            .client
            .get(&url)
            .query(&[("holder_address", holder.to_string())])
            .send()
            .await
            .map_err(|e| ExplorerError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ExplorerError::HttpStatus(status.as_u16()));
        }
        let envelope: InstancesEnvelope = resp
            .json()
            .await
            .map_err(|e| ExplorerError::Decode(e.to_string()))?;
        Ok(envelope.items)
    }
}
