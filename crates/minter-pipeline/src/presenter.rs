//! Post-success result presentation.
//!
//! Resolves a confirmed mint back to viewable metadata through the
//! gateway fallback. Failure here never rolls back or invalidates the
//! mint; the token already exists on-chain and only the confirmation
//! display degrades.

use minter_core::{TokenMetadata, TokenUri, TxId};
use minter_pinning::{GatewaySet, ResolutionError};
use serde::Serialize;

/// What the success screen shows for a freshly minted token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayableResult {
    pub name: String,
    pub creator: String,
    pub image_url: String,
    pub tx_id: TxId,
}

/// Fetch the token metadata document and resolve its image to a servable
/// URL, both through the ordered gateway fallback.
pub async fn resolve_minted(
    gateways: &GatewaySet,
    token_uri: &TokenUri,
    tx_id: &TxId,
) -> Result<DisplayableResult, ResolutionError> {
    let document = gateways.fetch_json(token_uri).await?;
    let metadata: TokenMetadata =
        serde_json::from_value(document).unwrap_or_else(|_| TokenMetadata {
            name: String::new(),
            description: String::new(),
            image: String::new(),
            attributes: Vec::new(),
        });

    let image_url = gateways
        .resolve_url(&TokenUri(metadata.image.clone()))
        .await?;

    Ok(DisplayableResult {
        name: metadata.name.clone(),
        creator: metadata.creator().unwrap_or("Unknown").to_string(),
        image_url,
        tx_id: tx_id.clone(),
    })
}
