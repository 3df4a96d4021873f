//! Pipeline sequencing.
//!
//! One orchestrator serializes mint submissions for its session: an
//! atomic in-flight flag rejects a second initiation outright instead of
//! queueing it. Reads (eligibility checks, explorer queries) are not
//! coordinated with a running pipeline.
//!
//! Every stage failure is caught here and converted to a `Failed` status
//! with a structured cause; no error escapes the orchestrator boundary
//! and nothing is retried automatically. A retry is a fresh run.

use crate::presenter::{resolve_minted, DisplayableResult};
use crate::status::StatusReporter;
use minter_core::eligibility::evaluate;
use minter_core::{
    validate_request, BadgeCatalog, BadgeTier, ChainClient, ChainClientError, Eligibility,
    FailureCause, FailureKind, IneligibilityReason, MintOutcome, MintReceipt, MintRequest,
    PipelineStatus, TokenMetadata, TokenUri, ValidationError, WalletAddress,
};
use minter_pinning::{ContentPublisher, GatewaySet, PinningClient, PublishError};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Blocks required before a mint counts as confirmed.
    pub confirmation_depth: u32,
    pub badge_catalog: BadgeCatalog,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confirmation_depth: 1,
            badge_catalog: BadgeCatalog::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error(transparent)]
    Chain(#[from] ChainClientError),
    #[error(transparent)]
    Ineligible(#[from] IneligibilityReason),
    #[error("badge artwork not configured for {0}")]
    MissingBadgeArtwork(BadgeTier),
    #[error("another mint is already in progress")]
    Busy,
}

impl PipelineError {
    pub fn failure_cause(&self) -> FailureCause {
        let kind = match self {
            PipelineError::Validation(_) => FailureKind::Validation,
            PipelineError::Publish(e) if e.is_configuration() => FailureKind::Configuration,
            PipelineError::Publish(_) => FailureKind::Publish,
            PipelineError::Chain(ChainClientError::Timeout(_)) => FailureKind::ConfirmationTimeout,
            PipelineError::Chain(ChainClientError::Config(_)) => FailureKind::Configuration,
            PipelineError::Chain(_) => FailureKind::Submission,
            PipelineError::Ineligible(_) => FailureKind::Ineligible,
            PipelineError::MissingBadgeArtwork(_) => FailureKind::Configuration,
            PipelineError::Busy => FailureKind::Busy,
        };
        FailureCause::new(kind, self.to_string())
    }
}

/// A confirmed mint plus whatever the presenter could resolve for the
/// success display. `resolution_error` is set when every gateway failed;
/// the mint itself is unaffected.
#[derive(Debug, Clone, Serialize)]
pub struct MintedToken {
    pub outcome: MintOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayableResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_error: Option<String>,
}

/// Terminal result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct MintRunResult {
    pub status: PipelineStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minted: Option<MintedToken>,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct MintPipeline<C, P> {
    chain: Arc<C>,
    publisher: ContentPublisher<P>,
    gateways: GatewaySet,
    status: StatusReporter,
    cfg: PipelineConfig,
    in_flight: AtomicBool,
}

impl<C, P> MintPipeline<C, P>
where
    C: ChainClient,
    P: PinningClient,
{
    pub fn new(chain: Arc<C>, pinning: Arc<P>, gateways: GatewaySet, cfg: PipelineConfig) -> Self {
        Self {
            chain,
            publisher: ContentPublisher::new(pinning),
            gateways,
            status: StatusReporter::new(),
            cfg,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn status(&self) -> &StatusReporter {
        &self.status
    }

    pub fn chain(&self) -> &Arc<C> {
        &self.chain
    }

    /// Run the full mint pipeline for a request.
    pub async fn mint(&self, request: MintRequest) -> MintRunResult {
        let guard = match self.begin() {
            Ok(guard) => guard,
            Err(e) => return self.rejected(e),
        };
        let result = self.run_mint(&request).await;
        drop(guard);
        self.finish(result)
    }

    /// Run the badge claim flow: live eligibility gate, then a mint of
    /// the tier's pre-built badge URI.
    pub async fn claim_badge(&self, tier: BadgeTier) -> MintRunResult {
        let guard = match self.begin() {
            Ok(guard) => guard,
            Err(e) => return self.rejected(e),
        };
        let result = self.run_claim(tier).await;
        drop(guard);
        self.finish(result)
    }

    fn begin(&self) -> Result<InFlightGuard<'_>, PipelineError> {
        match self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Ok(InFlightGuard(&self.in_flight)),
            Err(_) => Err(PipelineError::Busy),
        }
    }

    /// A rejected initiation must not clobber the narration of the run
    /// that is actually executing, so the reporter is left untouched.
    fn rejected(&self, e: PipelineError) -> MintRunResult {
        MintRunResult {
            status: PipelineStatus::Failed {
                cause: e.failure_cause(),
            },
            minted: None,
        }
    }

    fn finish(&self, result: Result<MintedToken, PipelineError>) -> MintRunResult {
        match result {
            Ok(minted) => MintRunResult {
                status: self.status.current(),
                minted: Some(minted),
            },
            Err(e) => {
                let cause = e.failure_cause();
                warn!(kind = ?cause.kind, error = %e, "pipeline run failed");
                self.status.set(PipelineStatus::Failed {
                    cause: cause.clone(),
                });
                MintRunResult {
                    status: PipelineStatus::Failed { cause },
                    minted: None,
                }
            }
        }
    }

    async fn run_mint(&self, request: &MintRequest) -> Result<MintedToken, PipelineError> {
        self.status.set(PipelineStatus::Validating);
        validate_request(request)?;
        let recipient = self.chain.wallet_address().await?;

        let (token_uri, metadata) = match (&request.token_uri_override, &request.asset) {
            (Some(uri), _) => (uri.clone(), None),
            (None, Some(asset)) => {
                let (published, meta) = self
                    .publisher
                    .publish_with_progress(
                        asset,
                        &request.display_name,
                        &request.creator_name,
                        |target| self.status.set(PipelineStatus::Uploading { target }),
                    )
                    .await?;
                info!(
                    asset = %published.asset_cid,
                    metadata = %published.metadata_cid,
                    "content published"
                );
                (published.metadata_uri, Some(meta))
            }
            (None, None) => return Err(ValidationError::IncompleteRequest.into()),
        };

        let receipt = self.submit_and_confirm(&recipient, &token_uri).await?;
        Ok(self.present(&token_uri, metadata, &receipt).await)
    }

    async fn run_claim(&self, tier: BadgeTier) -> Result<MintedToken, PipelineError> {
        self.status.set(PipelineStatus::Validating);
        let wallet = self.chain.wallet_address().await?;

        // The gate is re-derived from live chain state immediately before
        // submission, never cached. A balance change inside the
        // read-then-act window remains possible on a public chain.
        let balance = self.chain.balance_of(&wallet).await?;
        let claimed = self.chain.has_claimed(&wallet, tier.tier_id()).await?;
        if let Eligibility::Ineligible(reason) = evaluate(tier, balance, claimed) {
            return Err(reason.into());
        }

        let token_uri = self
            .cfg
            .badge_catalog
            .token_uri(tier)
            .ok_or(PipelineError::MissingBadgeArtwork(tier))?;
        info!(tier = %tier, balance, "claim gate passed");

        let receipt = self.submit_and_confirm(&wallet, &token_uri).await?;
        Ok(self.present(&token_uri, None, &receipt).await)
    }

    async fn submit_and_confirm(
        &self,
        recipient: &WalletAddress,
        token_uri: &TokenUri,
    ) -> Result<MintReceipt, PipelineError> {
        self.status.set(PipelineStatus::AwaitingSignature);
        let pending = self.chain.submit_mint(recipient, token_uri).await?;

        self.status.set(PipelineStatus::AwaitingConfirmation {
            tx_id: pending.tx_id.clone(),
        });
        let receipt = self
            .chain
            .await_confirmation(&pending, self.cfg.confirmation_depth)
            .await?;

        self.status.set(PipelineStatus::Succeeded {
            tx_id: receipt.tx_id.clone(),
        });
        Ok(receipt)
    }

    async fn present(
        &self,
        token_uri: &TokenUri,
        metadata: Option<TokenMetadata>,
        receipt: &MintReceipt,
    ) -> MintedToken {
        let (display, resolution_error) =
            match resolve_minted(&self.gateways, token_uri, &receipt.tx_id).await {
                Ok(display) => (Some(display), None),
                Err(e) => {
                    warn!(error = %e, "metadata resolution failed after a confirmed mint");
                    (None, Some(e.to_string()))
                }
            };

        MintedToken {
            outcome: MintOutcome {
                tx_id: receipt.tx_id.clone(),
                confirmed: true,
                token_uri: token_uri.clone(),
                metadata,
            },
            display,
            resolution_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minter_core::chain::ChainClientError;
    use minter_pinning::PinningError;

    #[test]
    fn failure_kinds_follow_the_taxonomy() {
        let cases = [
            (
                PipelineError::Validation(ValidationError::IncompleteRequest),
                FailureKind::Validation,
            ),
            (
                PipelineError::Publish(PublishError::Metadata(PinningError::Network(
                    "down".to_string(),
                ))),
                FailureKind::Publish,
            ),
            (
                PipelineError::Publish(PublishError::Asset(PinningError::Config(
                    "no credentials".to_string(),
                ))),
                FailureKind::Configuration,
            ),
            (
                PipelineError::Chain(ChainClientError::Rejected("denied".to_string())),
                FailureKind::Submission,
            ),
            (
                PipelineError::Chain(ChainClientError::Timeout("slow".to_string())),
                FailureKind::ConfirmationTimeout,
            ),
            (
                PipelineError::Ineligible(IneligibilityReason::AlreadyClaimed {
                    tier: BadgeTier::Bronze,
                }),
                FailureKind::Ineligible,
            ),
            (PipelineError::Busy, FailureKind::Busy),
        ];
        for (error, expected) in cases {
            assert_eq!(error.failure_cause().kind, expected, "{error}");
        }
    }

    #[test]
    fn submission_messages_survive_verbatim() {
        let cause = PipelineError::Chain(ChainClientError::Rejected(
            "user rejected signature".to_string(),
        ))
        .failure_cause();
        assert!(cause.message.contains("user rejected signature"));
    }
}
