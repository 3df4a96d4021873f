//! Transport-agnostic pinning client seam.

use async_trait::async_trait;
use minter_core::Cid;

#[derive(Debug, thiserror::Error)]
pub enum PinningError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("pinning service returned http status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("decode error: {0}")]
    Decode(String),
}

/// Write operations against the content-addressed storage network.
///
/// Identifiers are assigned by the network; two pins of identical content
/// may or may not deduplicate, and callers must not rely on either.
#[async_trait]
pub trait PinningClient: Send + Sync {
    /// Store a binary asset, returning its content identifier.
    async fn pin_file(
        &self,
        file_name: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<Cid, PinningError>;

    /// Store a JSON document, returning its content identifier.
    async fn pin_json(&self, document: &serde_json::Value) -> Result<Cid, PinningError>;
}
