//! Deterministic in-memory pinning store for tests and offline smoke paths.

use crate::client::{PinningClient, PinningError};
use async_trait::async_trait;
use minter_core::Cid;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct MockPinState {
    /// Operation log in pin order: `file:<cid>` / `json:<cid>`.
    operations: Vec<String>,
    documents: Vec<(Cid, serde_json::Value)>,
    fail_next_file: Option<String>,
    fail_next_json: Option<String>,
}

/// Content identifiers are derived from the content itself, so re-pinning
/// identical bytes yields the same identifier (the network is allowed, not
/// required, to behave this way).
#[derive(Debug, Default)]
pub struct MockPinningClient {
    state: Mutex<MockPinState>,
}

impl MockPinningClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_file(&self, message: impl Into<String>) {
        let mut st = self.state.lock().expect("mutex poisoned");
        st.fail_next_file = Some(message.into());
    }

    pub fn fail_next_json(&self, message: impl Into<String>) {
        let mut st = self.state.lock().expect("mutex poisoned");
        st.fail_next_json = Some(message.into());
    }

    /// Pin operations in the order they happened.
    pub fn operations(&self) -> Vec<String> {
        self.state.lock().expect("mutex poisoned").operations.clone()
    }

    pub fn pin_count(&self) -> usize {
        self.state.lock().expect("mutex poisoned").operations.len()
    }

    /// The JSON document pinned under `cid`, if any.
    pub fn document(&self, cid: &Cid) -> Option<serde_json::Value> {
        let st = self.state.lock().expect("mutex poisoned");
        st.documents
            .iter()
            .find(|(c, _)| c == cid)
            .map(|(_, doc)| doc.clone())
    }

    fn derive_cid(content: &[u8]) -> Cid {
        Cid(format!("mock{}", blake3::hash(content).to_hex()))
    }
}

#[async_trait]
impl PinningClient for MockPinningClient {
    async fn pin_file(
        &self,
        _file_name: &str,
        _content_type: &str,
        content: Vec<u8>,
    ) -> Result<Cid, PinningError> {
        let mut st = self.state.lock().expect("mutex poisoned");
        if let Some(msg) = st.fail_next_file.take() {
            return Err(PinningError::Network(msg));
        }
        let cid = Self::derive_cid(&content);
        st.operations.push(format!("file:{cid}"));
        Ok(cid)
    }

    async fn pin_json(&self, document: &serde_json::Value) -> Result<Cid, PinningError> {
        let mut st = self.state.lock().expect("mutex poisoned");
        if let Some(msg) = st.fail_next_json.take() {
            return Err(PinningError::Network(msg));
        }
        let bytes =
            serde_json::to_vec(document).map_err(|e| PinningError::Decode(e.to_string()))?;
        let cid = Self::derive_cid(&bytes);
        st.operations.push(format!("json:{cid}"));
        st.documents.push((cid.clone(), document.clone()));
        Ok(cid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn identical_content_pins_to_the_same_cid() {
        let client = MockPinningClient::new();
        let a = client
            .pin_file("a.png", "image/png", vec![1, 2, 3])
            .await
            .unwrap();
        let b = client
            .pin_file("b.png", "image/png", vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(client.pin_count(), 2);
    }

    #[tokio::test]
    async fn pinned_documents_are_retrievable() {
        let client = MockPinningClient::new();
        let doc = json!({"name": "Trailblazer"});
        let cid = client.pin_json(&doc).await.unwrap();
        assert_eq!(client.document(&cid), Some(doc));
    }

    #[tokio::test]
    async fn injected_failure_fires_once() {
        let client = MockPinningClient::new();
        client.fail_next_json("gateway unavailable");
        let err = client.pin_json(&json!({})).await.unwrap_err();
        assert!(matches!(err, PinningError::Network(m) if m == "gateway unavailable"));
        assert!(client.pin_json(&json!({})).await.is_ok());
    }
}
