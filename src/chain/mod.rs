//! Chain integration subsystem.
//!
//! # Data Flow
//! ```text
//! RunConfig (ws endpoint, signer URI, pallet, authority)
//!     → signer.rs (sr25519 key derivation, account parsing)
//!     → rpc.rs (JSON-RPC over WebSocket: keystore, endpoint, proofs)
//!     → client.rs (NodeClient: signed extrinsics, block events)
//!     → dispatch.rs (dispatch errors → metadata → readable reason)
//! ```
//!
//! # Security Constraints
//! - Secret URIs are never logged
//! - All custom RPC calls have a configurable timeout
//! - No retries: every failure is reported to the runner as-is

pub mod api;
pub mod client;
pub mod dispatch;
pub mod rpc;
pub mod signer;
pub mod types;

pub use api::{ChainApi, Connect};
pub use client::{NodeClient, NodeConnector};
pub use dispatch::{DispatchError, ErrorCatalog, ModuleErrorDetails};
pub use types::{
    AccountId32, ChainError, ChainResult, EventBatch, EventPhase, EventRecord, Subscription,
    TxHash,
};
