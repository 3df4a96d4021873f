//! The publish sequence: asset first, then the metadata that embeds it.
//!
//! Ordering is strict. The metadata document must reference the asset
//! identifier produced by the immediately preceding upload, never a stale
//! or placeholder value, so there is no parallelism between the two pins.
//! A partial failure (asset pinned, metadata pin failed) leaves an
//! unreferenced asset on the network; content-addressed storage makes the
//! orphan harmless and it is not retried here.

use crate::client::{PinningClient, PinningError};
use minter_core::{AssetUpload, Cid, TokenMetadata, TokenUri, UploadTarget};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Result of content publishing. Immutable once created; one per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedContent {
    pub asset_cid: Cid,
    pub asset_uri: TokenUri,
    pub metadata_cid: Cid,
    pub metadata_uri: TokenUri,
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("asset upload failed: {0}")]
    Asset(#[source] PinningError),
    #[error("metadata upload failed: {0}")]
    Metadata(#[source] PinningError),
    #[error("failed reading asset content: {0}")]
    Io(String),
    #[error("metadata serialization failed: {0}")]
    Serialize(String),
}

impl PublishError {
    /// Whether the underlying cause is missing service configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PublishError::Asset(PinningError::Config(_))
                | PublishError::Metadata(PinningError::Config(_))
        )
    }
}

pub struct ContentPublisher<P> {
    client: Arc<P>,
}

impl<P: PinningClient> ContentPublisher<P> {
    pub fn new(client: Arc<P>) -> Self {
        Self { client }
    }

    /// Publish an asset and its metadata document.
    pub async fn publish(
        &self,
        asset: &AssetUpload,
        display_name: &str,
        creator_name: &str,
    ) -> Result<(PublishedContent, TokenMetadata), PublishError> {
        self.publish_with_progress(asset, display_name, creator_name, |_| {})
            .await
    }

    /// Same as [`publish`](Self::publish), reporting each upload stage as
    /// it starts.
    pub async fn publish_with_progress(
        &self,
        asset: &AssetUpload,
        display_name: &str,
        creator_name: &str,
        on_stage: impl Fn(UploadTarget) + Send,
    ) -> Result<(PublishedContent, TokenMetadata), PublishError> {
        on_stage(UploadTarget::Asset);
        let content = asset
            .read_content()
            .await
            .map_err(|e| PublishError::Io(e.to_string()))?;
        let asset_cid = self
            .client
            .pin_file(
                &asset.descriptor.file_name,
                &asset.descriptor.content_type,
                content,
            )
            .await
            .map_err(PublishError::Asset)?;
        let asset_uri = asset_cid.to_uri();
        debug!(cid = %asset_cid, "asset pinned");

        let metadata = TokenMetadata::for_mint(display_name, creator_name, &asset_uri);
        let document =
            serde_json::to_value(&metadata).map_err(|e| PublishError::Serialize(e.to_string()))?;

        on_stage(UploadTarget::Metadata);
        let metadata_cid = self
            .client
            .pin_json(&document)
            .await
            .map_err(PublishError::Metadata)?;
        let metadata_uri = metadata_cid.to_uri();
        debug!(cid = %metadata_cid, "metadata pinned");

        Ok((
            PublishedContent {
                asset_cid,
                asset_uri,
                metadata_cid,
                metadata_uri,
            },
            metadata,
        ))
    }
}
