//! Daily check-in flow.
//!
//! The contract enforces its own rules; the cooldown pre-check here just
//! avoids submitting a transaction that is known to be pointless.

use minter_core::{ChainClientError, CheckInClient, TxId, WalletAddress};
use serde::Serialize;
use tracing::info;

/// One check-in per rolling 24 hours.
pub const CHECK_IN_COOLDOWN_SECS: u64 = 86_400;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckInOutcome {
    Completed { tx_id: TxId },
    CoolingDown { seconds_remaining: u64 },
}

/// Check in unless the last check-in is under the cooldown window.
/// `now_secs` is the caller's clock so the rule stays testable.
pub async fn daily_check_in<C: CheckInClient>(
    chain: &C,
    wallet: &WalletAddress,
    now_secs: u64,
) -> Result<CheckInOutcome, ChainClientError> {
    let last = chain.last_check_in(wallet).await?;
    if last > 0 {
        let elapsed = now_secs.saturating_sub(last);
        if elapsed < CHECK_IN_COOLDOWN_SECS {
            return Ok(CheckInOutcome::CoolingDown {
                seconds_remaining: CHECK_IN_COOLDOWN_SECS - elapsed,
            });
        }
    }

    let tx_id = chain.check_in().await?;
    info!(wallet = %wallet.short(), tx = %tx_id, "checked in");
    Ok(CheckInOutcome::Completed { tx_id })
}
