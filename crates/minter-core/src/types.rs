//! Stable identifier and document types shared across the workspace.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// EVM account address, stored as lowercase `0x` hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Normalizes to lowercase so addresses compare and hash consistently
    /// regardless of checksum casing in the input.
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Short `0xabcd...ef12` form for logs and display.
    pub fn short(&self) -> String {
        if self.0.len() <= 10 {
            return self.0.clone();
        }
        format!("{}...{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content identifier on the content-addressed storage network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cid(pub String);

impl Cid {
    /// `ipfs://` locator for this identifier.
    pub fn to_uri(&self) -> TokenUri {
        TokenUri(format!("ipfs://{}", self.0))
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Token metadata locator, either an `ipfs://` locator or a plain URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenUri(pub String);

impl TokenUri {
    /// The content identifier, if this is an `ipfs://` locator.
    pub fn ipfs_cid(&self) -> Option<&str> {
        self.0.strip_prefix("ipfs://")
    }
}

impl fmt::Display for TokenUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque transaction identifier returned by the chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(pub String);

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declared properties of a user-selected asset.
///
/// Validation works on this descriptor alone; content is materialized only
/// after the asset has passed the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    pub file_name: String,
    /// Declared media type, e.g. `image/png`.
    pub content_type: String,
    pub size_bytes: u64,
}

/// Where the asset bytes live until upload time.
#[derive(Debug, Clone)]
pub enum AssetContent {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// A user-selected asset: declared descriptor plus a content source.
#[derive(Debug, Clone)]
pub struct AssetUpload {
    pub descriptor: AssetDescriptor,
    pub content: AssetContent,
}

impl AssetUpload {
    pub fn from_bytes(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        let file_name = file_name.into();
        let content_type = content_type.into();
        Self {
            descriptor: AssetDescriptor {
                file_name,
                content_type,
                size_bytes: bytes.len() as u64,
            },
            content: AssetContent::Bytes(bytes),
        }
    }

    /// Materialize the asset bytes. Only called after validation.
    pub async fn read_content(&self) -> std::io::Result<Vec<u8>> {
        match &self.content {
            AssetContent::Bytes(b) => Ok(b.clone()),
            AssetContent::Path(p) => tokio::fs::read(p).await,
        }
    }
}

/// User intent to mint a token.
///
/// Invariant: either `token_uri_override` is present, or all of `asset`,
/// `display_name` and `creator_name` are present. Enforced by
/// [`crate::validate::validate_request`].
#[derive(Debug, Clone, Default)]
pub struct MintRequest {
    pub asset: Option<AssetUpload>,
    pub display_name: String,
    pub creator_name: String,
    pub token_uri_override: Option<TokenUri>,
}

impl MintRequest {
    pub fn new(asset: AssetUpload, display_name: impl Into<String>, creator_name: impl Into<String>) -> Self {
        Self {
            asset: Some(asset),
            display_name: display_name.into(),
            creator_name: creator_name.into(),
            token_uri_override: None,
        }
    }

    /// Request that skips publishing and mints a pre-built URI directly.
    pub fn with_token_uri(uri: TokenUri) -> Self {
        Self {
            token_uri_override: Some(uri),
            ..Self::default()
        }
    }
}

/// One `{trait_type, value}` entry in a token metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataAttribute {
    pub trait_type: String,
    pub value: String,
}

/// ERC-721 token metadata document.
///
/// Fields default to empty on deserialization because explorer-sourced
/// documents are frequently partial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub attributes: Vec<MetadataAttribute>,
}

pub const CREATOR_TRAIT: &str = "Creator";

impl TokenMetadata {
    /// Document for a fresh mint: `Creator` attribute is always present and
    /// the image points at the just-published asset.
    pub fn for_mint(display_name: &str, creator_name: &str, image_uri: &TokenUri) -> Self {
        Self {
            name: display_name.to_string(),
            description: format!("An NFT by {creator_name}"),
            image: image_uri.0.clone(),
            attributes: vec![MetadataAttribute {
                trait_type: CREATOR_TRAIT.to_string(),
                value: creator_name.to_string(),
            }],
        }
    }

    /// The `Creator` attribute value, if present.
    pub fn creator(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.trait_type == CREATOR_TRAIT)
            .map(|a| a.value.as_str())
    }
}

/// Result of a mint submission.
///
/// Created pending at submission, `confirmed` once the chain reports the
/// required confirmation depth, terminal after that. `metadata` is filled
/// in post-confirmation when the publish step produced it locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintOutcome {
    pub tx_id: TxId,
    pub confirmed: bool,
    pub token_uri: TokenUri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TokenMetadata>,
}
