//! Content publishing for the Genesis Minter.
//!
//! Two write operations against a content-addressed storage network
//! ("store binary" and "store JSON document"), composed into the strict
//! publish sequence, plus the read side: an ordered gateway-fallback
//! resolver for content locators.

#![forbid(unsafe_code)]

pub mod client;
pub mod gateway;
pub mod mock;
pub mod pinata;
pub mod publisher;

pub use client::{PinningClient, PinningError};
pub use gateway::{GatewaySet, ResolutionError, DEFAULT_GATEWAYS};
pub use mock::MockPinningClient;
pub use pinata::{PinataClient, PinataConfig};
pub use publisher::{ContentPublisher, PublishError, PublishedContent};
