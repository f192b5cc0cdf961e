//! Capability interface the runner drives the node through.

use std::future::Future;
use tokio::sync::mpsc;

use crate::chain::dispatch::ErrorCatalog;
use crate::chain::types::{AccountId32, ChainResult, EventBatch, ProofRecord, Subscription, TxHash};
use crate::config::RunConfig;

/// The privileged operations an e2e run needs, and nothing more.
///
/// Calls are issued one at a time by the runner; implementations keep no
/// ordering state of their own.
pub trait ChainApi: ErrorCatalog {
    /// Register a key in the node's authority keystore (`author_insertKey`).
    fn insert_author_key(
        &self,
        key_type: &str,
        suri: &str,
        public_key: &str,
    ) -> impl Future<Output = ChainResult<()>>;

    /// Point the offchain worker at upstream Filecoin RPC endpoints.
    fn set_endpoint(&self, urls: &[String]) -> impl Future<Output = ChainResult<()>>;

    /// Register `account` as a relayer. Execution failures surface as events.
    fn add_relayer(&self, account: &AccountId32) -> impl Future<Output = ChainResult<TxHash>>;

    /// Transfer `amount` to `account`.
    fn deposit_fund(
        &self,
        account: &AccountId32,
        amount: u128,
    ) -> impl Future<Output = ChainResult<TxHash>>;

    /// Check a proof against its CID. `Ok(false)` is a rejected proof, not an error.
    fn verify_proof(&self, proof: &ProofRecord) -> impl Future<Output = ChainResult<bool>>;

    /// Stream one [`EventBatch`] per block into `sink` until the handle is dropped.
    fn subscribe_events(
        &self,
        sink: mpsc::UnboundedSender<EventBatch>,
    ) -> impl Future<Output = ChainResult<Subscription>>;
}

/// Opens a [`ChainApi`] once the node is ready.
pub trait Connect {
    type Api: ChainApi;

    fn connect(&self, config: &RunConfig) -> impl Future<Output = ChainResult<Self::Api>>;
}
