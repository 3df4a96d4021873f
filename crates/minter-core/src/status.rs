//! Pipeline status model.
//!
//! A single current-operation value, not a log: consumers render only the
//! latest state. Terminal states (`Succeeded`, `Failed`) leave only via an
//! explicit reset by the user.

use crate::types::TxId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which document is currently being pushed to the storage network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadTarget {
    Asset,
    Metadata,
}

/// Stable failure classification carried on `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    Publish,
    Submission,
    ConfirmationTimeout,
    Resolution,
    Configuration,
    Ineligible,
    Busy,
}

/// Structured cause for a failed pipeline run: a stable kind code plus the
/// underlying message, surfaced verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureCause {
    pub kind: FailureKind,
    pub message: String,
}

impl FailureCause {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Current pipeline operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineStatus {
    #[default]
    Idle,
    Validating,
    Uploading {
        target: UploadTarget,
    },
    AwaitingSignature,
    AwaitingConfirmation {
        tx_id: TxId,
    },
    Succeeded {
        tx_id: TxId,
    },
    Failed {
        cause: FailureCause,
    },
}

impl PipelineStatus {
    /// Terminal states stay in place until an explicit reset.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Human narration for the current state.
    pub fn message(&self) -> String {
        match self {
            Self::Idle => "idle".to_string(),
            Self::Validating => "checking the selected file".to_string(),
            Self::Uploading {
                target: UploadTarget::Asset,
            } => "uploading file to the storage network".to_string(),
            Self::Uploading {
                target: UploadTarget::Metadata,
            } => "uploading metadata to the storage network".to_string(),
            Self::AwaitingSignature => {
                "metadata ready, confirm the transaction in your wallet".to_string()
            }
            Self::AwaitingConfirmation { tx_id } => {
                format!("transaction {tx_id} sent, waiting for confirmation")
            }
            Self::Succeeded { tx_id } => format!("token minted in transaction {tx_id}"),
            Self::Failed { cause } => format!("minting failed: {}", cause.message),
        }
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
