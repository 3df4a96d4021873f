//! Observable status cell.
//!
//! A single slot, overwritten (never merged or appended) by whichever
//! stage is currently executing. Consumers subscribe and render only the
//! latest value.

use minter_core::PipelineStatus;
use tokio::sync::watch;

#[derive(Debug)]
pub struct StatusReporter {
    tx: watch::Sender<PipelineStatus>,
}

impl StatusReporter {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(PipelineStatus::Idle);
        Self { tx }
    }

    /// Overwrite the current status. Latest wins.
    pub fn set(&self, status: PipelineStatus) {
        // send_replace so the write succeeds with zero subscribers too.
        let _ = self.tx.send_replace(status);
    }

    pub fn current(&self) -> PipelineStatus {
        self.tx.borrow().clone()
    }

    /// Subscribe to status changes. The receiver observes the latest
    /// value at the time of each read, not an event log.
    pub fn subscribe(&self) -> watch::Receiver<PipelineStatus> {
        self.tx.subscribe()
    }

    /// Return to `Idle`, allowed only from a terminal state. This is the
    /// explicit "mint another" action; in-flight narration is never reset
    /// out from under a running pipeline.
    pub fn reset(&self) -> bool {
        if !self.current().is_terminal() {
            return false;
        }
        self.set(PipelineStatus::Idle);
        true
    }
}

impl Default for StatusReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minter_core::{FailureCause, FailureKind, TxId};

    #[test]
    fn latest_write_wins() {
        let reporter = StatusReporter::new();
        reporter.set(PipelineStatus::Validating);
        reporter.set(PipelineStatus::AwaitingSignature);
        assert_eq!(reporter.current(), PipelineStatus::AwaitingSignature);
    }

    #[test]
    fn reset_is_refused_outside_terminal_states() {
        let reporter = StatusReporter::new();
        reporter.set(PipelineStatus::Validating);
        assert!(!reporter.reset());
        assert_eq!(reporter.current(), PipelineStatus::Validating);
    }

    #[test]
    fn reset_clears_terminal_states() {
        let reporter = StatusReporter::new();
        reporter.set(PipelineStatus::Succeeded {
            tx_id: TxId("0xabc".to_string()),
        });
        assert!(reporter.reset());
        assert_eq!(reporter.current(), PipelineStatus::Idle);

        reporter.set(PipelineStatus::Failed {
            cause: FailureCause::new(FailureKind::Publish, "down"),
        });
        assert!(reporter.reset());
        assert_eq!(reporter.current(), PipelineStatus::Idle);
    }

    #[tokio::test]
    async fn subscribers_observe_the_latest_value() {
        let reporter = StatusReporter::new();
        let mut rx = reporter.subscribe();
        reporter.set(PipelineStatus::Validating);
        reporter.set(PipelineStatus::AwaitingSignature);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), PipelineStatus::AwaitingSignature);
    }
}
