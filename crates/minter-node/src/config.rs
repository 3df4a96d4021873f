//! Node configuration: TOML with `env:VAR` indirection plus explicit
//! environment overrides for the pinning credentials.

use anyhow::{anyhow, Context, Result};
use minter_explorer::ExplorerConfig;
use minter_pinning::{GatewaySet, PinataConfig, DEFAULT_GATEWAYS};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MinterConfig {
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub pinning: PinningConfig,
    #[serde(default)]
    pub gateways: GatewaysConfig,
    #[serde(default)]
    pub explorer: ExplorerSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    #[serde(default = "default_node_label")]
    pub label: String,
}

fn default_node_label() -> String {
    "minter-node".to_string()
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            label: default_node_label(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    #[serde(default)]
    pub rpc_url: String,
    #[serde(default)]
    pub chain_id: u64,
    #[serde(default)]
    pub token_contract: String,
    #[serde(default)]
    pub badge_contract: String,
    #[serde(default)]
    pub checkin_contract: Option<String>,
    #[serde(default = "default_confirmation_depth")]
    pub confirmation_depth: u32,
    #[serde(default = "default_confirmation_poll_ms")]
    pub confirmation_poll_ms: u64,
}

fn default_confirmation_depth() -> u32 {
    1
}

fn default_confirmation_poll_ms() -> u64 {
    2_000
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            chain_id: 0,
            token_contract: String::new(),
            badge_contract: String::new(),
            checkin_contract: None,
            confirmation_depth: default_confirmation_depth(),
            confirmation_poll_ms: default_confirmation_poll_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PinningConfig {
    #[serde(default = "default_pinning_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default = "default_pinning_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_pinning_base_url() -> String {
    minter_pinning::pinata::DEFAULT_BASE_URL.to_string()
}

fn default_pinning_timeout_ms() -> u64 {
    30_000
}

impl Default for PinningConfig {
    fn default() -> Self {
        Self {
            base_url: default_pinning_base_url(),
            api_key: String::new(),
            api_secret: String::new(),
            timeout_ms: default_pinning_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewaysConfig {
    #[serde(default = "default_gateway_bases")]
    pub bases: Vec<String>,
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,
}

fn default_gateway_bases() -> Vec<String> {
    DEFAULT_GATEWAYS.iter().map(|s| s.to_string()).collect()
}

fn default_attempt_timeout_ms() -> u64 {
    5_000
}

impl Default for GatewaysConfig {
    fn default() -> Self {
        Self {
            bases: default_gateway_bases(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerSection {
    #[serde(default = "default_explorer_base_url")]
    pub base_url: String,
    #[serde(default = "default_explorer_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_explorer_base_url() -> String {
    "https://basecamp.cloud.blockscout.com".to_string()
}

fn default_explorer_timeout_ms() -> u64 {
    10_000
}

fn default_page_size() -> u64 {
    100
}

impl Default for ExplorerSection {
    fn default() -> Self {
        Self {
            base_url: default_explorer_base_url(),
            timeout_ms: default_explorer_timeout_ms(),
            page_size: default_page_size(),
        }
    }
}

/// Resolves `env:VAR` string values anywhere in the document.
fn resolve_env_refs(mut value: toml::Value) -> Result<toml::Value> {
    fn walk(value: &mut toml::Value) -> Result<()> {
        match value {
            toml::Value::String(s) => {
                if let Some(var) = s.strip_prefix("env:") {
                    let var = var.trim();
                    if var.is_empty() {
                        return Err(anyhow!("invalid env: reference (empty var name)"));
                    }
                    let resolved = env::var(var)
                        .with_context(|| format!("missing required environment variable: {var}"))?;
                    *s = resolved;
                }
            }
            toml::Value::Array(items) => {
                for item in items {
                    walk(item)?;
                }
            }
            toml::Value::Table(table) => {
                for (_, item) in table.iter_mut() {
                    walk(item)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    walk(&mut value)?;
    Ok(value)
}

/// Loads a config file, or falls back to all defaults when no path is
/// given (mock mode runs with zero configuration).
pub fn load_config(path: Option<&Path>) -> Result<MinterConfig> {
    let mut cfg = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed reading config file: {}", path.display()))?;
            let parsed: toml::Value = raw
                .parse()
                .with_context(|| format!("failed parsing config toml: {}", path.display()))?;
            let resolved = resolve_env_refs(parsed)?;
            resolved
                .try_into::<MinterConfig>()
                .with_context(|| format!("failed decoding config: {}", path.display()))?
        }
        None => MinterConfig::default(),
    };

    // Explicit env overrides win over file values.
    if let Ok(v) = env::var("PINATA_API_KEY") {
        if !v.trim().is_empty() {
            cfg.pinning.api_key = v;
        }
    }
    if let Ok(v) = env::var("PINATA_API_SECRET") {
        if !v.trim().is_empty() {
            cfg.pinning.api_secret = v;
        }
    }

    Ok(cfg)
}

pub fn required_env(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("missing required env var {name}"))
}

impl MinterConfig {
    /// Real chain integration needs explicit endpoint and contract
    /// settings; mock mode ignores all of them.
    pub fn validate_for_chain_mode_http(&self) -> Result<()> {
        if self.chain.rpc_url.trim().is_empty() {
            return Err(anyhow!("chain.rpc_url is required in --chain-mode http"));
        }
        if self.chain.chain_id == 0 {
            return Err(anyhow!("chain.chain_id is required in --chain-mode http"));
        }
        if self.chain.token_contract.trim().is_empty() {
            return Err(anyhow!("chain.token_contract is required in --chain-mode http"));
        }
        if self.chain.badge_contract.trim().is_empty() {
            return Err(anyhow!("chain.badge_contract is required in --chain-mode http"));
        }
        if self.chain.confirmation_depth == 0 {
            return Err(anyhow!("chain.confirmation_depth must be >= 1"));
        }
        if self.gateways.bases.is_empty() {
            return Err(anyhow!("gateways.bases must list at least one gateway"));
        }
        Ok(())
    }

    pub fn pinata_config(&self) -> PinataConfig {
        PinataConfig {
            base_url: self.pinning.base_url.clone(),
            api_key: self.pinning.api_key.clone(),
            api_secret: self.pinning.api_secret.clone(),
            timeout_ms: self.pinning.timeout_ms,
        }
    }

    pub fn gateway_set(&self) -> GatewaySet {
        GatewaySet::new(
            self.gateways.bases.clone(),
            Duration::from_millis(self.gateways.attempt_timeout_ms),
        )
    }

    pub fn explorer_config(&self) -> ExplorerConfig {
        ExplorerConfig {
            base_url: self.explorer.base_url.clone(),
            timeout_ms: self.explorer.timeout_ms,
        }
    }

    pub fn ethers_chain_config(&self) -> minter_core::chain::ethers_client::EthersChainConfig {
        minter_core::chain::ethers_client::EthersChainConfig {
            rpc_url: self.chain.rpc_url.clone(),
            chain_id: self.chain.chain_id,
            token_contract: self.chain.token_contract.clone(),
            badge_contract: self.chain.badge_contract.clone(),
            checkin_contract: self.chain.checkin_contract.clone(),
            confirmation_poll_ms: self.chain.confirmation_poll_ms,
        }
    }
}
