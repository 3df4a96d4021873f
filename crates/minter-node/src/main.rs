//! Genesis Minter CLI node.
//!
//! Chain modes mirror the client seam:
//! - `mock`: offline deterministic clients (default), no configuration
//!   required.
//! - `http`: real RPC adapter; requires `[chain]` config and the
//!   `MINTER_PRIVATE_KEY` environment variable.

#![forbid(unsafe_code)]

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use minter_core::chain::ethers_client::EthersChainClient;
use minter_core::chain::mock_client::MockChainClient;
use minter_core::{
    AssetContent, AssetDescriptor, AssetUpload, BadgeTier, ChainClient, CheckInClient, Cid,
    MintRequest, TokenUri, WalletAddress,
};
use minter_explorer::{compute_leaderboard, ExplorerClient, PageQuery, SortOrder};
use minter_node::config::{load_config, required_env, MinterConfig};
use minter_pinning::{GatewaySet, MockPinningClient, PinataClient, PinningClient, PinningError};
use minter_pipeline::{daily_check_in, MintPipeline, MintRunResult, PipelineConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Genesis Minter node")]
struct Args {
    /// Path to a TOML config file. If omitted, uses `MINTER_CONFIG` or
    /// built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Chain mode:
    /// - mock: offline deterministic mock clients (default)
    /// - http: real RPC adapter (requires config)
    #[arg(long, value_enum, default_value_t = ChainMode::Mock)]
    chain_mode: ChainMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum, PartialEq, Eq)]
enum ChainMode {
    Mock,
    Http,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Mint a token from an image file, or directly from a pre-built URI.
    Mint {
        /// Image file to publish.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Token display name.
        #[arg(long)]
        name: Option<String>,
        /// Creator name recorded in the metadata attributes.
        #[arg(long)]
        creator: Option<String>,
        /// Pre-built token URI; skips publishing entirely.
        #[arg(long)]
        token_uri: Option<String>,
    },

    /// Claim a badge tier if the connected wallet qualifies.
    ClaimBadge {
        /// Tier name: bronze, silver, gold, platinum or diamond.
        #[arg(long)]
        tier: String,
    },

    /// Daily check-in against the check-in contract.
    CheckIn,

    /// Recent transactions for an address, newest first.
    Transactions {
        #[arg(long)]
        address: String,
        #[arg(long, default_value_t = 3)]
        limit: usize,
    },

    /// Token holdings of an address with resolved metadata fields.
    Collection {
        #[arg(long)]
        address: String,
        #[arg(long, default_value_t = 3)]
        limit: usize,
    },

    /// Top minters by token-transfer count.
    Leaderboard {
        #[arg(long, default_value_t = 20)]
        top: usize,
    },
}

/// Pinning backend selected by chain mode and credential presence.
///
/// `Disabled` defers the configuration failure to the first publish
/// attempt: operations that never publish (badge claims, pre-built URIs)
/// stay usable without storage credentials.
enum AnyPinning {
    Pinata(PinataClient),
    Mock(MockPinningClient),
    Disabled(String),
}

#[async_trait]
impl PinningClient for AnyPinning {
    async fn pin_file(
        &self,
        file_name: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<Cid, PinningError> {
        match self {
            AnyPinning::Pinata(c) => c.pin_file(file_name, content_type, content).await,
            AnyPinning::Mock(c) => c.pin_file(file_name, content_type, content).await,
            AnyPinning::Disabled(reason) => Err(PinningError::Config(reason.clone())),
        }
    }

    async fn pin_json(&self, document: &serde_json::Value) -> Result<Cid, PinningError> {
        match self {
            AnyPinning::Pinata(c) => c.pin_json(document).await,
            AnyPinning::Mock(c) => c.pin_json(document).await,
            AnyPinning::Disabled(reason) => Err(PinningError::Config(reason.clone())),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    // Logs go to stderr; stdout carries the command's JSON result.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config_path = args
        .config
        .clone()
        .or_else(|| std::env::var("MINTER_CONFIG").ok().map(PathBuf::from));
    let cfg = load_config(config_path.as_deref())?;

    match args.command {
        Command::Transactions { address, limit } => run_transactions(&cfg, &address, limit).await,
        Command::Collection { address, limit } => run_collection(&cfg, &address, limit).await,
        Command::Leaderboard { top } => run_leaderboard(&cfg, top).await,
        command => match args.chain_mode {
            ChainMode::Mock => {
                let chain = Arc::new(
                    MockChainClient::default().with_badge_catalog(Default::default()),
                );
                let pinning = Arc::new(AnyPinning::Mock(MockPinningClient::new()));
                // Mock mode stays offline: resolution degrades by design.
                let gateways = GatewaySet::new(
                    vec!["http://127.0.0.1:9/ipfs/".to_string()],
                    Duration::from_millis(250),
                );
                dispatch_chain(chain, pinning, gateways, &cfg, command).await
            }
            ChainMode::Http => {
                cfg.validate_for_chain_mode_http()?;
                let key = required_env("MINTER_PRIVATE_KEY")?;
                let chain = Arc::new(
                    EthersChainClient::connect(&cfg.ethers_chain_config(), &key)
                        .await
                        .context("failed connecting the chain client")?,
                );
                let pinning = Arc::new(match PinataClient::new(cfg.pinata_config()) {
                    Ok(client) => AnyPinning::Pinata(client),
                    Err(e) => AnyPinning::Disabled(e.to_string()),
                });
                dispatch_chain(chain, pinning, cfg.gateway_set(), &cfg, command).await
            }
        },
    }
}

async fn dispatch_chain<C>(
    chain: Arc<C>,
    pinning: Arc<AnyPinning>,
    gateways: GatewaySet,
    cfg: &MinterConfig,
    command: Command,
) -> Result<()>
where
    C: ChainClient + CheckInClient + 'static,
{
    match command {
        Command::Mint {
            file,
            name,
            creator,
            token_uri,
        } => {
            let request = build_mint_request(file, name, creator, token_uri)?;
            let pipeline = build_pipeline(chain, pinning, gateways, cfg);
            report_run(run_with_narration(&pipeline, pipeline.mint(request)).await)
        }
        Command::ClaimBadge { tier } => {
            let tier = BadgeTier::parse(&tier)
                .ok_or_else(|| anyhow!("unknown badge tier: {tier:?}"))?;
            let pipeline = build_pipeline(chain, pinning, gateways, cfg);
            report_run(run_with_narration(&pipeline, pipeline.claim_badge(tier)).await)
        }
        Command::CheckIn => run_check_in(chain.as_ref()).await,
        // Read commands are dispatched before chain selection.
        _ => bail!("internal: read command reached chain dispatch"),
    }
}

fn build_pipeline<C>(
    chain: Arc<C>,
    pinning: Arc<AnyPinning>,
    gateways: GatewaySet,
    cfg: &MinterConfig,
) -> MintPipeline<C, AnyPinning>
where
    C: ChainClient + 'static,
{
    MintPipeline::new(
        chain,
        pinning,
        gateways,
        PipelineConfig {
            confirmation_depth: cfg.chain.confirmation_depth,
            badge_catalog: Default::default(),
        },
    )
}

/// Runs a pipeline future while narrating status transitions.
async fn run_with_narration<C, F>(pipeline: &MintPipeline<C, AnyPinning>, run: F) -> MintRunResult
where
    C: ChainClient,
    F: std::future::Future<Output = MintRunResult>,
{
    let mut rx = pipeline.status().subscribe();
    let narrator = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let status = rx.borrow().clone();
            info!(status = %status, "pipeline");
            if status.is_terminal() {
                break;
            }
        }
    });
    let result = run.await;
    let _ = narrator.await;
    result
}

fn report_run(result: MintRunResult) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&result)?);
    if result.status.is_failed() {
        bail!("{}", result.status.message());
    }
    Ok(())
}

async fn run_check_in<C>(chain: &C) -> Result<()>
where
    C: ChainClient + CheckInClient,
{
    let wallet = chain.wallet_address().await?;
    let now_secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before the unix epoch")?
        .as_secs();
    let outcome = daily_check_in(chain, &wallet, now_secs).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn run_transactions(cfg: &MinterConfig, address: &str, limit: usize) -> Result<()> {
    let client = ExplorerClient::new(cfg.explorer_config())?;
    let mut records = client
        .transactions(
            &WalletAddress::new(address),
            SortOrder::Descending,
            PageQuery {
                page: 1,
                offset: cfg.explorer.page_size,
            },
        )
        .await?;
    records.truncate(limit);
    println!("{}", serde_json::to_string_pretty(&summarize_transactions(&records))?);
    Ok(())
}

fn summarize_transactions(records: &[minter_explorer::TxRecord]) -> Vec<serde_json::Value> {
    records
        .iter()
        .map(|tx| {
            serde_json::json!({
                "hash": tx.hash,
                "from": tx.from,
                "to": if tx.to.is_empty() { "contract creation".to_string() } else { tx.to.clone() },
                "value": tx.value,
                "block": tx.block_number,
            })
        })
        .collect()
}

async fn run_collection(cfg: &MinterConfig, address: &str, limit: usize) -> Result<()> {
    if cfg.chain.token_contract.trim().is_empty() {
        bail!("chain.token_contract is required for the collection query");
    }
    let client = ExplorerClient::new(cfg.explorer_config())?;
    let gateways = cfg.gateway_set();
    let mut instances = client
        .nft_instances(&cfg.chain.token_contract, &WalletAddress::new(address))
        .await?;
    instances.truncate(limit);

    let mut items = Vec::with_capacity(instances.len());
    for instance in &instances {
        let metadata = instance.metadata.as_ref();
        let image_url = match metadata.map(|m| m.image.as_str()).filter(|i| !i.is_empty()) {
            Some(image) => gateways
                .resolve_url(&TokenUri(image.to_string()))
                .await
                .ok(),
            None => None,
        };
        items.push(serde_json::json!({
            "token_id": instance.token_id,
            "name": metadata.map(|m| m.name.clone()).unwrap_or_default(),
            "creator": metadata.and_then(|m| m.creator()).unwrap_or("Unknown"),
            "image_url": image_url,
        }));
    }
    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}

async fn run_leaderboard(cfg: &MinterConfig, top: usize) -> Result<()> {
    if cfg.chain.token_contract.trim().is_empty() {
        bail!("chain.token_contract is required for the leaderboard query");
    }
    let client = ExplorerClient::new(cfg.explorer_config())?;
    let transfers = client
        .token_transfers(
            &cfg.chain.token_contract,
            SortOrder::Ascending,
            PageQuery {
                page: 1,
                offset: cfg.explorer.page_size,
            },
        )
        .await?;
    let board = compute_leaderboard(&transfers, top);
    println!("{}", serde_json::to_string_pretty(&board)?);
    Ok(())
}

fn build_mint_request(
    file: Option<PathBuf>,
    name: Option<String>,
    creator: Option<String>,
    token_uri: Option<String>,
) -> Result<MintRequest> {
    if let Some(uri) = token_uri {
        return Ok(MintRequest::with_token_uri(TokenUri(uri)));
    }
    let (Some(file), Some(name), Some(creator)) = (file, name, creator) else {
        bail!("provide --token-uri, or all of --file, --name and --creator");
    };

    let metadata = std::fs::metadata(&file)
        .with_context(|| format!("failed reading file metadata: {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "asset".to_string());

    Ok(MintRequest::new(
        AssetUpload {
            descriptor: AssetDescriptor {
                file_name,
                content_type: content_type_for(&file),
                size_bytes: metadata.len(),
            },
            content: AssetContent::Path(file),
        },
        name,
        creator,
    ))
}

/// Declared media type from the file extension. A cheap mapping, matching
/// the boundary-check nature of the validator.
fn content_type_for(path: &Path) -> String {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
    .to_string()
}
