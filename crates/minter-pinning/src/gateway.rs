//! Ordered gateway fallback for content resolution.
//!
//! A content locator maps to one candidate URL per configured gateway,
//! tried sequentially with a fixed per-attempt timeout. First success
//! wins; the whole resolution fails only after every candidate has
//! failed. Resolution failures never affect already-pinned or
//! already-minted state.

use minter_core::TokenUri;
use std::time::Duration;
use tracing::debug;

/// Default mirrored gateways, in trial order.
pub const DEFAULT_GATEWAYS: [&str; 3] = [
    "https://gateway.pinata.cloud/ipfs/",
    "https://cloudflare-ipfs.com/ipfs/",
    "https://ipfs.io/ipfs/",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("empty content locator")]
    EmptyUri,
    #[error("all {attempts} gateway attempts failed for {uri}")]
    AllGatewaysFailed { uri: String, attempts: usize },
}

#[derive(Debug, Clone)]
pub struct GatewaySet {
    bases: Vec<String>,
    attempt_timeout: Duration,
    client: reqwest::Client,
}

impl GatewaySet {
    pub fn new(bases: Vec<String>, attempt_timeout: Duration) -> Self {
        Self {
            bases,
            attempt_timeout,
            client: reqwest::Client::new(),
        }
    }

    /// Candidate URLs for a locator, one per gateway for `ipfs://`
    /// locators, the locator itself otherwise.
    pub fn candidates(&self, uri: &str) -> Vec<String> {
        match uri.strip_prefix("ipfs://") {
            Some(cid) => self
                .bases
                .iter()
                .map(|base| format!("{}{}", base, cid))
                .collect(),
            None => vec![uri.to_string()],
        }
    }

    /// Fetch a JSON document, trying each candidate in order.
    ///
    /// An HTTP error status, a transport error, a timeout, or an
    /// undecodable body all count as a failed attempt and move on to the
    /// next gateway.
    pub async fn fetch_json(&self, uri: &TokenUri) -> Result<serde_json::Value, ResolutionError> {
        let candidates = self.non_empty_candidates(uri)?;
        for url in &candidates {
            match self.try_fetch_json(url).await {
                Some(value) => return Ok(value),
                None => debug!(url = %url, "gateway attempt failed"),
            }
        }
        Err(ResolutionError::AllGatewaysFailed {
            uri: uri.0.clone(),
            attempts: candidates.len(),
        })
    }

    /// Resolve a locator to the first candidate URL that answers with an
    /// HTTP success. Used for image locators where the caller needs a
    /// servable URL rather than the content itself.
    pub async fn resolve_url(&self, uri: &TokenUri) -> Result<String, ResolutionError> {
        let candidates = self.non_empty_candidates(uri)?;
        for url in &candidates {
            if self.try_probe(url).await {
                return Ok(url.clone());
            }
            debug!(url = %url, "gateway attempt failed");
        }
        Err(ResolutionError::AllGatewaysFailed {
            uri: uri.0.clone(),
            attempts: candidates.len(),
        })
    }

    fn non_empty_candidates(&self, uri: &TokenUri) -> Result<Vec<String>, ResolutionError> {
        if uri.0.trim().is_empty() {
            return Err(ResolutionError::EmptyUri);
        }
        Ok(self.candidates(&uri.0))
    }

    async fn try_fetch_json(&self, url: &str) -> Option<serde_json::Value> {
        let fut = self.client.get(url).send();
        let resp = tokio::time::timeout(self.attempt_timeout, fut).await.ok()?.ok()?;
        if !resp.status().is_success() {
            return None;
        }
        tokio::time::timeout(self.attempt_timeout, resp.json::<serde_json::Value>())
            .await
            .ok()?
            .ok()
    }

    async fn try_probe(&self, url: &str) -> bool {
        let fut = self.client.get(url).send();
        match tokio::time::timeout(self.attempt_timeout, fut).await {
            Ok(Ok(resp)) => resp.status().is_success(),
            _ => false,
        }
    }
}

impl Default for GatewaySet {
    fn default() -> Self {
        Self::new(
            DEFAULT_GATEWAYS.iter().map(|s| s.to_string()).collect(),
            Duration::from_secs(5),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipfs_locators_expand_to_every_gateway_in_order() {
        let gateways = GatewaySet::default();
        let candidates = gateways.candidates("ipfs://bafkexample");
        assert_eq!(
            candidates,
            vec![
                "https://gateway.pinata.cloud/ipfs/bafkexample",
                "https://cloudflare-ipfs.com/ipfs/bafkexample",
                "https://ipfs.io/ipfs/bafkexample",
            ]
        );
    }

    #[test]
    fn plain_urls_pass_through_untouched() {
        let gateways = GatewaySet::default();
        assert_eq!(
            gateways.candidates("https://example.com/meta.json"),
            vec!["https://example.com/meta.json"]
        );
    }

    #[tokio::test]
    async fn empty_locator_is_rejected_without_attempts() {
        let gateways = GatewaySet::default();
        let err = gateways.fetch_json(&TokenUri(String::new())).await.unwrap_err();
        assert_eq!(err, ResolutionError::EmptyUri);
    }
}
