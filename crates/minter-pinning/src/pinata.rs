//! HTTP adapter for the Pinata pinning API.

use crate::client::{PinningClient, PinningError};
use async_trait::async_trait;
use minter_core::Cid;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.pinata.cloud";

const PIN_FILE_PATH: &str = "/pinning/pinFileToIPFS";
const PIN_JSON_PATH: &str = "/pinning/pinJSONToIPFS";

/// Credentials and endpoint for the pinning service.
///
/// Both credentials are required: a publish operation cannot start without
/// them, so their absence fails at client construction rather than
/// mid-pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct PinataConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for PinataConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            api_secret: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl PinataConfig {
    pub fn validate(&self) -> Result<(), PinningError> {
        if self.base_url.trim().is_empty() {
            return Err(PinningError::Config("pinning.base_url is empty".to_string()));
        }
        if self.api_key.trim().is_empty() || self.api_secret.trim().is_empty() {
            return Err(PinningError::Config(
                "pinning credentials missing: set PINATA_API_KEY and PINATA_API_SECRET".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

#[derive(Debug, Clone)]
pub struct PinataClient {
    cfg: PinataConfig,
    client: reqwest::Client,
}

impl PinataClient {
    pub fn new(cfg: PinataConfig) -> Result<Self, PinningError> {
        cfg.validate()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| PinningError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self { cfg, client })
    }

    fn join_url(&self, path: &str) -> String {
        let base = self.cfg.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("pinata_api_key", self.cfg.api_key.trim())
            .header("pinata_secret_api_key", self.cfg.api_secret.trim())
    }

    async fn decode_pin(resp: reqwest::Response) -> Result<Cid, PinningError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PinningError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        let parsed: PinResponse = resp
            .json()
            .await
            .map_err(|e| PinningError::Decode(e.to_string()))?;
        if parsed.ipfs_hash.trim().is_empty() {
            return Err(PinningError::Decode("empty IpfsHash in response".to_string()));
        }
        Ok(Cid(parsed.ipfs_hash))
    }
}

#[async_trait]
impl PinningClient for PinataClient {
    async fn pin_file(
        &self,
        file_name: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<Cid, PinningError> {
        let part = reqwest::multipart::Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| PinningError::Config(format!("invalid content type: {e}")))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp = self
            .auth(self.client.post(self.join_url(PIN_FILE_PATH)))
            .multipart(form)
            .send()
            .await
            .map_err(|e| PinningError::Network(e.to_string()))?;
        Self::decode_pin(resp).await
    }

    async fn pin_json(&self, document: &serde_json::Value) -> Result<Cid, PinningError> {
        let resp = self
            .auth(self.client.post(self.join_url(PIN_JSON_PATH)))
            .json(document)
            .send()
            .await
            .map_err(|e| PinningError::Network(e.to_string()))?;
        Self::decode_pin(resp).await
    }
}
