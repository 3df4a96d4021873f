//! End-to-end pipeline runs over the deterministic mocks.

use minter_core::chain::mock_client::{MockChainClient, MockFault};
use minter_core::{
    AssetContent, AssetDescriptor, AssetUpload, BadgeCatalog, BadgeTier, ChainClient, FailureKind,
    MintRequest, PipelineStatus, TokenUri,
};
use minter_pinning::{GatewaySet, MockPinningClient};
use minter_pipeline::{MintPipeline, PipelineConfig};
use std::sync::Arc;
use std::time::Duration;

fn dead_gateways() -> GatewaySet {
    // A closed local port refuses instantly; every attempt fails.
    GatewaySet::new(
        vec!["http://127.0.0.1:1/ipfs/".to_string()],
        Duration::from_millis(300),
    )
}

fn live_gateways(body: &'static str) -> GatewaySet {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("bind local server");
    let addr = server.server_addr().to_ip().expect("ip listen addr");
    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            let _ = request.respond(tiny_http::Response::from_string(body));
        }
    });
    GatewaySet::new(
        vec![format!("http://{addr}/ipfs/")],
        Duration::from_millis(1_000),
    )
}

fn pipeline(
    chain: Arc<MockChainClient>,
    pinning: Arc<MockPinningClient>,
    gateways: GatewaySet,
) -> MintPipeline<MockChainClient, MockPinningClient> {
    MintPipeline::new(chain, pinning, gateways, PipelineConfig::default())
}

fn jpeg_request() -> MintRequest {
    MintRequest::new(
        AssetUpload::from_bytes("trail.jpg", "image/jpeg", vec![0xD8; 2 * 1024 * 1024]),
        "Trailblazer",
        "Ada",
    )
}

#[tokio::test]
async fn mint_end_to_end_resolves_name_and_creator() {
    let chain = Arc::new(MockChainClient::default());
    let pinning = Arc::new(MockPinningClient::new());
    let gateways = live_gateways(
        r#"{"name":"Trailblazer","image":"ipfs://bafkimg",
            "attributes":[{"trait_type":"Creator","value":"Ada"}]}"#,
    );
    let pipeline = pipeline(Arc::clone(&chain), Arc::clone(&pinning), gateways);

    let result = pipeline.mint(jpeg_request()).await;

    assert!(matches!(result.status, PipelineStatus::Succeeded { .. }));
    let minted = result.minted.expect("minted token");
    assert!(minted.outcome.confirmed);
    assert!(minted.outcome.tx_id.0.starts_with("0x"));

    // The publish step produced metadata embedding the fresh asset pin.
    let metadata = minted.outcome.metadata.expect("local metadata");
    assert_eq!(metadata.name, "Trailblazer");
    assert!(metadata.image.starts_with("ipfs://mock"));

    // The presenter resolved the document through the gateway.
    let display = minted.display.expect("displayable result");
    assert_eq!(display.name, "Trailblazer");
    assert_eq!(display.creator, "Ada");
    assert!(display.image_url.contains("/ipfs/bafkimg"));

    assert_eq!(pinning.pin_count(), 2);
    assert_eq!(chain.mint_submissions(), 1);
}

#[tokio::test]
async fn oversize_file_fails_before_any_network_call() {
    let chain = Arc::new(MockChainClient::default());
    let pinning = Arc::new(MockPinningClient::new());
    let pipeline = pipeline(Arc::clone(&chain), Arc::clone(&pinning), dead_gateways());

    // Declared 15 MB PNG; the content itself is never read.
    let request = MintRequest {
        asset: Some(AssetUpload {
            descriptor: AssetDescriptor {
                file_name: "big.png".to_string(),
                content_type: "image/png".to_string(),
                size_bytes: 15 * 1024 * 1024,
            },
            content: AssetContent::Bytes(Vec::new()),
        }),
        display_name: "Trailblazer".to_string(),
        creator_name: "Ada".to_string(),
        token_uri_override: None,
    };

    let result = pipeline.mint(request).await;

    let PipelineStatus::Failed { cause } = result.status else {
        panic!("expected failure");
    };
    assert_eq!(cause.kind, FailureKind::Validation);
    assert!(cause.message.contains("file too large"));
    assert_eq!(pinning.pin_count(), 0);
    assert_eq!(chain.mint_submissions(), 0);
}

#[tokio::test]
async fn non_image_file_is_rejected() {
    let chain = Arc::new(MockChainClient::default());
    let pinning = Arc::new(MockPinningClient::new());
    let pipeline = pipeline(Arc::clone(&chain), Arc::clone(&pinning), dead_gateways());

    let request = MintRequest::new(
        AssetUpload::from_bytes("doc.pdf", "application/pdf", vec![0u8; 128]),
        "Trailblazer",
        "Ada",
    );
    let result = pipeline.mint(request).await;

    let PipelineStatus::Failed { cause } = result.status else {
        panic!("expected failure");
    };
    assert_eq!(cause.kind, FailureKind::Validation);
    assert_eq!(pinning.pin_count(), 0);
}

#[tokio::test]
async fn override_uri_skips_publishing_entirely() {
    let chain = Arc::new(MockChainClient::default());
    let pinning = Arc::new(MockPinningClient::new());
    let pipeline = pipeline(Arc::clone(&chain), Arc::clone(&pinning), dead_gateways());

    let result = pipeline
        .mint(MintRequest::with_token_uri(TokenUri(
            "ipfs://bafkprebuilt".to_string(),
        )))
        .await;

    assert!(matches!(result.status, PipelineStatus::Succeeded { .. }));
    assert_eq!(pinning.pin_count(), 0);
    assert_eq!(chain.mint_submissions(), 1);
}

#[tokio::test]
async fn insufficient_balance_blocks_the_silver_claim() {
    let chain = Arc::new(MockChainClient::default());
    let wallet = chain.wallet_address().await.unwrap();
    chain.set_balance(&wallet, 2);
    let pinning = Arc::new(MockPinningClient::new());
    let pipeline = pipeline(Arc::clone(&chain), pinning, dead_gateways());

    let result = pipeline.claim_badge(BadgeTier::Silver).await;

    let PipelineStatus::Failed { cause } = result.status else {
        panic!("expected failure");
    };
    assert_eq!(cause.kind, FailureKind::Ineligible);
    assert!(cause.message.contains("insufficient balance"));
    assert_eq!(chain.mint_submissions(), 0);
}

#[tokio::test]
async fn already_claimed_blocks_regardless_of_balance() {
    let chain = Arc::new(MockChainClient::default());
    let wallet = chain.wallet_address().await.unwrap();
    chain.set_balance(&wallet, 1_000);
    chain.set_claimed(&wallet, BadgeTier::Gold.tier_id());
    let pinning = Arc::new(MockPinningClient::new());
    let pipeline = pipeline(Arc::clone(&chain), pinning, dead_gateways());

    let result = pipeline.claim_badge(BadgeTier::Gold).await;

    let PipelineStatus::Failed { cause } = result.status else {
        panic!("expected failure");
    };
    assert_eq!(cause.kind, FailureKind::Ineligible);
    assert!(cause.message.contains("already claimed"));
    assert_eq!(chain.mint_submissions(), 0);
}

#[tokio::test]
async fn bronze_claim_succeeds_and_marks_the_tier_claimed() {
    let chain =
        Arc::new(MockChainClient::default().with_badge_catalog(BadgeCatalog::default()));
    let wallet = chain.wallet_address().await.unwrap();
    let pinning = Arc::new(MockPinningClient::new());
    let pipeline = pipeline(Arc::clone(&chain), pinning, dead_gateways());

    let result = pipeline.claim_badge(BadgeTier::Bronze).await;
    assert!(matches!(result.status, PipelineStatus::Succeeded { .. }));

    // A second claim of the same tier now fails the gate.
    let again = pipeline.claim_badge(BadgeTier::Bronze).await;
    let PipelineStatus::Failed { cause } = again.status else {
        panic!("expected failure");
    };
    assert!(cause.message.contains("already claimed"));
    assert_eq!(chain.mint_submissions(), 1);
    assert!(chain.has_claimed(&wallet, 1).await.unwrap());
}

#[tokio::test]
async fn gateway_exhaustion_degrades_display_but_not_the_mint() {
    let chain = Arc::new(MockChainClient::default());
    let pinning = Arc::new(MockPinningClient::new());
    let pipeline = pipeline(Arc::clone(&chain), pinning, dead_gateways());

    let result = pipeline.mint(jpeg_request()).await;

    assert!(matches!(result.status, PipelineStatus::Succeeded { .. }));
    assert!(matches!(
        pipeline.status().current(),
        PipelineStatus::Succeeded { .. }
    ));
    let minted = result.minted.expect("minted token");
    assert!(minted.outcome.confirmed);
    assert!(minted.display.is_none());
    let resolution_error = minted.resolution_error.expect("resolution error");
    assert!(resolution_error.contains("gateway"));
}

#[tokio::test]
async fn wallet_rejection_surfaces_verbatim() {
    let chain = Arc::new(MockChainClient::default());
    chain.set_fault(MockFault::Rejected("user rejected signature".to_string()));
    let pinning = Arc::new(MockPinningClient::new());
    let pipeline = pipeline(Arc::clone(&chain), pinning, dead_gateways());

    let result = pipeline.mint(jpeg_request()).await;

    let PipelineStatus::Failed { cause } = result.status else {
        panic!("expected failure");
    };
    assert_eq!(cause.kind, FailureKind::Submission);
    assert!(cause.message.contains("user rejected signature"));
}

#[tokio::test]
async fn confirmation_timeout_is_classified_separately() {
    let chain = Arc::new(MockChainClient::default());
    chain.set_fault(MockFault::ConfirmationTimeout("no inclusion".to_string()));
    let pinning = Arc::new(MockPinningClient::new());
    let pipeline = pipeline(Arc::clone(&chain), pinning, dead_gateways());

    let result = pipeline.mint(jpeg_request()).await;

    let PipelineStatus::Failed { cause } = result.status else {
        panic!("expected failure");
    };
    assert_eq!(cause.kind, FailureKind::ConfirmationTimeout);
}

#[tokio::test]
async fn metadata_pin_failure_stops_before_submission() {
    let chain = Arc::new(MockChainClient::default());
    let pinning = Arc::new(MockPinningClient::new());
    pinning.fail_next_json("pin service down");
    let pipeline = pipeline(Arc::clone(&chain), Arc::clone(&pinning), dead_gateways());

    let result = pipeline.mint(jpeg_request()).await;

    let PipelineStatus::Failed { cause } = result.status else {
        panic!("expected failure");
    };
    assert_eq!(cause.kind, FailureKind::Publish);
    // The asset pin stays orphaned; no submission happened.
    assert_eq!(pinning.pin_count(), 1);
    assert_eq!(chain.mint_submissions(), 0);
}

#[tokio::test]
async fn a_second_initiation_is_rejected_while_one_is_in_flight() {
    let chain = Arc::new(
        MockChainClient::default().with_submit_delay(Duration::from_millis(200)),
    );
    let pinning = Arc::new(MockPinningClient::new());
    let pipeline = Arc::new(pipeline(Arc::clone(&chain), pinning, dead_gateways()));

    let first = {
        let pipeline = Arc::clone(&pipeline);
        tokio::spawn(async move { pipeline.mint(jpeg_request()).await })
    };
    // Let the first run take the in-flight slot.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = pipeline
        .mint(MintRequest::with_token_uri(TokenUri(
            "ipfs://bafkother".to_string(),
        )))
        .await;
    let PipelineStatus::Failed { cause } = second.status else {
        panic!("expected busy rejection");
    };
    assert_eq!(cause.kind, FailureKind::Busy);

    let first = first.await.unwrap();
    assert!(matches!(first.status, PipelineStatus::Succeeded { .. }));
    // The rejection never clobbered the winning run's narration.
    assert!(matches!(
        pipeline.status().current(),
        PipelineStatus::Succeeded { .. }
    ));
    assert_eq!(chain.mint_submissions(), 1);
}

#[tokio::test]
async fn terminal_status_resets_only_by_explicit_action() {
    let chain = Arc::new(MockChainClient::default());
    let pinning = Arc::new(MockPinningClient::new());
    let pipeline = pipeline(Arc::clone(&chain), pinning, dead_gateways());

    let result = pipeline.mint(jpeg_request()).await;
    assert!(result.status.is_terminal());

    assert!(pipeline.status().reset());
    assert_eq!(pipeline.status().current(), PipelineStatus::Idle);
}
