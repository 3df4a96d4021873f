//! Leaderboard aggregation over token-transfer history.
//!
//! Pure and deterministic: ties are broken by wallet order so the same
//! transfer set always ranks identically.

use crate::TokenTransfer;
use minter_core::WalletAddress;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub wallet: WalletAddress,
    pub minted: u64,
}

/// Counts transfer recipients and returns the top `top` wallets by mint
/// count, descending, wallet ascending on ties.
pub fn compute_leaderboard(transfers: &[TokenTransfer], top: usize) -> Vec<LeaderboardEntry> {
    let mut counts: HashMap<WalletAddress, u64> = HashMap::new();
    for transfer in transfers {
        if transfer.to.trim().is_empty() {
            continue;
        }
        *counts.entry(WalletAddress::new(&transfer.to)).or_insert(0) += 1;
    }

    let mut entries: Vec<LeaderboardEntry> = counts
        .into_iter()
        .map(|(wallet, minted)| LeaderboardEntry { wallet, minted })
        .collect();
    entries.sort_by(|a, b| b.minted.cmp(&a.minted).then(a.wallet.cmp(&b.wallet)));
    entries.truncate(top);
    entries
}
