//! Deterministic in-memory mock chain for tests and offline smoke paths.

use super::{ChainClient, ChainClientError, CheckInClient, MintReceipt, PendingMint};
use crate::eligibility::{BadgeCatalog, BadgeTier};
use crate::types::{TokenUri, TxId, WalletAddress};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// Injected failure for the next submission.
#[derive(Debug, Clone)]
pub enum MockFault {
    Rejected(String),
    InsufficientFunds(String),
    Reverted(String),
    ConfirmationTimeout(String),
}

#[derive(Debug, Default)]
struct MockState {
    balances: HashMap<WalletAddress, u64>,
    claimed: HashSet<(WalletAddress, u64)>,
    tokens: BTreeMap<u64, (WalletAddress, TokenUri)>,
    pending: HashMap<TxId, u64>,
    next_token_id: u64,
    block_number: u64,
    now_secs: u64,
    last_check_in: HashMap<WalletAddress, u64>,
    mint_submissions: u64,
    fault: Option<MockFault>,
}

#[derive(Debug)]
pub struct MockChainClient {
    wallet: WalletAddress,
    chain_id: u64,
    badge_catalog: Option<BadgeCatalog>,
    submit_delay: Option<Duration>,
    state: Mutex<MockState>,
}

impl MockChainClient {
    pub fn new(wallet: impl Into<String>) -> Self {
        Self {
            wallet: WalletAddress::new(wallet),
            chain_id: 123_420_001, // deterministic default
            badge_catalog: None,
            submit_delay: None,
            state: Mutex::new(MockState {
                next_token_id: 1,
                block_number: 1,
                now_secs: 1_700_000_000,
                ..MockState::default()
            }),
        }
    }

    /// Teach the mock the badge artwork table so a badge-URI mint also
    /// flips the claimed flag, the way the badge contract does.
    pub fn with_badge_catalog(mut self, catalog: BadgeCatalog) -> Self {
        self.badge_catalog = Some(catalog);
        self
    }

    /// Hold each submission open for `delay` before it lands.
    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = Some(delay);
        self
    }

    pub fn set_balance(&self, owner: &WalletAddress, balance: u64) {
        let mut st = self.state.lock().expect("mutex poisoned");
        st.balances.insert(owner.clone(), balance);
    }

    pub fn set_claimed(&self, owner: &WalletAddress, tier_id: u64) {
        let mut st = self.state.lock().expect("mutex poisoned");
        st.claimed.insert((owner.clone(), tier_id));
    }

    pub fn set_last_check_in(&self, owner: &WalletAddress, unix_secs: u64) {
        let mut st = self.state.lock().expect("mutex poisoned");
        st.last_check_in.insert(owner.clone(), unix_secs);
    }

    /// Fail the next submission with the given fault.
    pub fn set_fault(&self, fault: MockFault) {
        let mut st = self.state.lock().expect("mutex poisoned");
        st.fault = Some(fault);
    }

    /// Total `safeMint` submissions accepted by the mock.
    pub fn mint_submissions(&self) -> u64 {
        self.state.lock().expect("mutex poisoned").mint_submissions
    }

    pub fn now_secs(&self) -> u64 {
        self.state.lock().expect("mutex poisoned").now_secs
    }

    fn make_tx_id(wallet: &WalletAddress, uri: &TokenUri, nonce: u64) -> TxId {
        let mut h = blake3::Hasher::new();
        h.update(wallet.as_str().as_bytes());
        h.update(uri.0.as_bytes());
        h.update(&nonce.to_be_bytes());
        TxId(format!("0x{}", h.finalize().to_hex()))
    }

    fn tier_for_uri(&self, uri: &TokenUri) -> Option<BadgeTier> {
        let catalog = self.badge_catalog.as_ref()?;
        let cid = uri.ipfs_cid()?;
        BadgeTier::ALL
            .into_iter()
            .find(|tier| catalog.cid(*tier).map(|c| c.0.as_str()) == Some(cid))
    }
}

impl Default for MockChainClient {
    fn default() -> Self {
        Self::new("0x00000000000000000000000000000000000000aa")
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn wallet_address(&self) -> Result<WalletAddress, ChainClientError> {
        Ok(self.wallet.clone())
    }

    async fn chain_id(&self) -> Result<u64, ChainClientError> {
        Ok(self.chain_id)
    }

    async fn balance_of(&self, owner: &WalletAddress) -> Result<u64, ChainClientError> {
        let st = self.state.lock().expect("mutex poisoned");
        Ok(st.balances.get(owner).copied().unwrap_or(0))
    }

    async fn has_claimed(
        &self,
        owner: &WalletAddress,
        tier_id: u64,
    ) -> Result<bool, ChainClientError> {
        let st = self.state.lock().expect("mutex poisoned");
        Ok(st.claimed.contains(&(owner.clone(), tier_id)))
    }

    async fn submit_mint(
        &self,
        recipient: &WalletAddress,
        token_uri: &TokenUri,
    ) -> Result<PendingMint, ChainClientError> {
        if let Some(delay) = self.submit_delay {
            tokio::time::sleep(delay).await;
        }

        let mut st = self.state.lock().expect("mutex poisoned");
        match st.fault.take() {
            Some(MockFault::Rejected(msg)) => return Err(ChainClientError::Rejected(msg)),
            Some(MockFault::InsufficientFunds(msg)) => {
                return Err(ChainClientError::InsufficientFunds(msg))
            }
            Some(MockFault::Reverted(msg)) => return Err(ChainClientError::Reverted(msg)),
            Some(fault @ MockFault::ConfirmationTimeout(_)) => {
                // Submission itself goes through; the confirmation fails.
                st.fault = Some(fault);
            }
            None => {}
        }

        let token_id = st.next_token_id;
        st.next_token_id += 1;
        st.mint_submissions += 1;

        let tx_id = Self::make_tx_id(recipient, token_uri, token_id);
        st.pending.insert(tx_id.clone(), token_id);
        st.tokens
            .insert(token_id, (recipient.clone(), token_uri.clone()));
        Ok(PendingMint { tx_id })
    }

    async fn await_confirmation(
        &self,
        pending: &PendingMint,
        _confirmations: u32,
    ) -> Result<MintReceipt, ChainClientError> {
        let mut st = self.state.lock().expect("mutex poisoned");
        if let Some(MockFault::ConfirmationTimeout(msg)) = st.fault.take() {
            return Err(ChainClientError::Timeout(msg));
        }

        let token_id = st
            .pending
            .remove(&pending.tx_id)
            .ok_or_else(|| ChainClientError::Decode("unknown pending transaction".to_string()))?;

        st.block_number += 1;
        st.now_secs += 10;

        let (recipient, uri) = st
            .tokens
            .get(&token_id)
            .cloned()
            .ok_or_else(|| ChainClientError::Decode("unknown token".to_string()))?;
        *st.balances.entry(recipient.clone()).or_insert(0) += 1;
        if let Some(tier) = self.tier_for_uri(&uri) {
            st.claimed.insert((recipient, tier.tier_id()));
        }

        Ok(MintReceipt {
            tx_id: pending.tx_id.clone(),
            block_number: st.block_number,
            token_id: Some(token_id),
        })
    }

    async fn token_uri(&self, token_id: u64) -> Result<TokenUri, ChainClientError> {
        let st = self.state.lock().expect("mutex poisoned");
        st.tokens
            .get(&token_id)
            .map(|(_, uri)| uri.clone())
            .ok_or_else(|| ChainClientError::Reverted(format!("unknown token {token_id}")))
    }

    async fn owner_of(&self, token_id: u64) -> Result<WalletAddress, ChainClientError> {
        let st = self.state.lock().expect("mutex poisoned");
        st.tokens
            .get(&token_id)
            .map(|(owner, _)| owner.clone())
            .ok_or_else(|| ChainClientError::Reverted(format!("unknown token {token_id}")))
    }
}

#[async_trait]
impl CheckInClient for MockChainClient {
    async fn last_check_in(&self, owner: &WalletAddress) -> Result<u64, ChainClientError> {
        let st = self.state.lock().expect("mutex poisoned");
        Ok(st.last_check_in.get(owner).copied().unwrap_or(0))
    }

    async fn check_in(&self) -> Result<TxId, ChainClientError> {
        let mut st = self.state.lock().expect("mutex poisoned");
        st.block_number += 1;
        st.now_secs += 10;
        let now = st.now_secs;
        let tx_id = Self::make_tx_id(
            &self.wallet,
            &TokenUri(format!("checkin:{now}")),
            st.block_number,
        );
        st.last_check_in.insert(self.wallet.clone(), now);
        Ok(tx_id)
    }
}
