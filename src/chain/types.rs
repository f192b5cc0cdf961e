//! Chain-specific types and error definitions.

use thiserror::Error;
use tokio::task::JoinHandle;

pub use crate::config::schema::{ProofKind, ProofRecord, RelayerAuthority};
pub use subxt::utils::{AccountId32, H256};

/// Hash of a submitted extrinsic.
pub type TxHash = H256;

/// When in the block an event was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    /// While applying the extrinsic at this index.
    ApplyExtrinsic(u32),
    Finalization,
    Initialization,
}

impl From<subxt::events::Phase> for EventPhase {
    fn from(phase: subxt::events::Phase) -> Self {
        match phase {
            subxt::events::Phase::ApplyExtrinsic(index) => Self::ApplyExtrinsic(index),
            subxt::events::Phase::Finalization => Self::Finalization,
            subxt::events::Phase::Initialization => Self::Initialization,
        }
    }
}

/// A single runtime event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Pallet name, e.g. `System`.
    pub section: String,
    /// Event variant name, e.g. `ExtrinsicFailed`.
    pub method: String,
    pub phase: EventPhase,
    /// SCALE-encoded event fields.
    pub data: Vec<u8>,
}

impl EventRecord {
    pub fn new(section: impl Into<String>, method: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            section: section.into(),
            method: method.into(),
            phase: EventPhase::ApplyExtrinsic(0),
            data,
        }
    }
}

/// All events of one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBatch {
    pub block: u64,
    pub events: Vec<EventRecord>,
}

/// Keeps an event subscription alive; the feeding task stops on drop.
#[derive(Debug)]
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Errors that can occur during chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The WebSocket transport failed.
    #[error("WebSocket error: {0}")]
    Transport(#[from] Box<tokio_tungstenite::tungstenite::Error>),

    /// The node answered with a JSON-RPC error.
    #[error("RPC error {code} from {method}: {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },

    /// RPC request timed out.
    #[error("RPC timeout after {secs} seconds waiting for {method}")]
    Timeout { method: String, secs: u64 },

    /// The connection closed while a request was in flight.
    #[error("connection closed while waiting for {0}")]
    Closed(String),

    /// A request or response could not be (de)serialized.
    #[error("malformed RPC payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Metadata-aware client failure (connection, submission, subscription).
    #[error("chain client error: {0}")]
    Client(#[from] Box<subxt::Error>),

    /// Invalid secret URI or derivation error.
    #[error("signer error: {0}")]
    Signer(String),

    /// Account string is neither 32-byte hex nor SS58.
    #[error("invalid account '{0}'")]
    Account(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for ChainError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Transport(Box::new(e))
    }
}

impl From<subxt::Error> for ChainError {
    fn from(e: subxt::Error) -> Self {
        Self::Client(Box::new(e))
    }
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChainError::Rpc {
            method: "filecoindot_setRpcEndpoint".to_string(),
            code: -32602,
            message: "invalid endpoint".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "RPC error -32602 from filecoindot_setRpcEndpoint: invalid endpoint"
        );

        let err = ChainError::Timeout {
            method: "author_insertKey".to_string(),
            secs: 30,
        };
        assert!(err.to_string().contains("30 seconds"));
    }

    #[tokio::test]
    async fn test_subscription_aborts_on_drop() {
        let task = tokio::spawn(std::future::pending::<()>());
        let abort = task.abort_handle();
        drop(Subscription::new(task));
        for _ in 0..100 {
            if abort.is_finished() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert!(abort.is_finished());
    }
}
