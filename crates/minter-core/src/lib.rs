//! Core data model for the Genesis Minter.
//!
//! This crate defines the stable types and invariants the rest of the
//! workspace builds on. It is **transport-agnostic**: runtime transports
//! (EVM RPC, pinning HTTP) are implemented as adapters behind the client
//! traits in [`chain`].
//!
//! ## Design constraints
//! - **Contract-first**: request/outcome types and their invariants come
//!   first; adapters conform to them.
//! - **No hidden globals**: wallet and contract access go through an
//!   injected [`chain::ChainClient`], never ambient state.
//! - **Deterministic mocks**: every client trait ships an in-memory mock
//!   so the pipeline can run offline and under test.
#![forbid(unsafe_code)]

pub mod chain;
pub mod eligibility;
pub mod status;
pub mod types;
pub mod validate;

pub use chain::{ChainClient, ChainClientError, CheckInClient, MintReceipt, PendingMint};
pub use eligibility::{BadgeCatalog, BadgeTier, Eligibility, IneligibilityReason};
pub use status::{FailureCause, FailureKind, PipelineStatus, UploadTarget};
pub use types::{
    AssetContent, AssetDescriptor, AssetUpload, Cid, MetadataAttribute, MintOutcome, MintRequest,
    TokenMetadata, TokenUri, TxId, WalletAddress,
};
pub use validate::{validate_asset, validate_request, ValidationError, MAX_ASSET_BYTES};
