//! Node client implementing [`ChainApi`].
//!
//! # Responsibilities
//! - Custom RPC methods (keystore, endpoint, proof verification) over [`RpcTransport`]
//! - Signed extrinsics and the block event subscription over a metadata-aware client
//! - Resolve module errors against the connected runtime's metadata

use futures_util::StreamExt;
use serde_json::json;
use std::time::Duration;
use subxt::dynamic::{self, Value};
use subxt::{OnlineClient, PolkadotConfig};
use subxt_signer::sr25519::Keypair;
use tokio::sync::mpsc;

use crate::chain::api::{ChainApi, Connect};
use crate::chain::dispatch::{ErrorCatalog, ModuleErrorDetails};
use crate::chain::rpc::RpcTransport;
use crate::chain::signer::keypair_from_uri;
use crate::chain::types::{
    AccountId32, ChainResult, EventBatch, EventRecord, ProofKind, ProofRecord, RelayerAuthority,
    Subscription, TxHash,
};
use crate::config::RunConfig;

/// Connected node client.
pub struct NodeClient {
    rpc: RpcTransport,
    api: OnlineClient<PolkadotConfig>,
    /// Fixed test identity signing every extrinsic.
    signer: Keypair,
    pallet: String,
    authority: RelayerAuthority,
    transfer_call: String,
}

impl NodeClient {
    /// Connect both transports to `config.node.ws`.
    pub async fn connect(config: &RunConfig) -> ChainResult<Self> {
        let request_timeout = Duration::from_secs(config.node.rpc_timeout_secs);
        let rpc = RpcTransport::connect(&config.node.ws, request_timeout).await?;
        let api = OnlineClient::<PolkadotConfig>::from_insecure_url(&config.node.ws).await?;
        let signer = keypair_from_uri(&config.setup.signer_uri)?;

        tracing::info!(
            ws = %config.node.ws,
            spec_version = api.runtime_version().spec_version,
            signer = %hex::encode(signer.public_key().0),
            authority = ?config.setup.relayer_authority,
            "Chain client connected"
        );

        Ok(Self {
            rpc,
            api,
            signer,
            pallet: config.setup.pallet.clone(),
            authority: config.setup.relayer_authority,
            transfer_call: config
                .setup
                .deposit
                .as_ref()
                .map(|deposit| deposit.transfer_call.clone())
                .unwrap_or_else(|| "transfer".to_string()),
        })
    }
}

impl ChainApi for NodeClient {
    async fn insert_author_key(
        &self,
        key_type: &str,
        suri: &str,
        public_key: &str,
    ) -> ChainResult<()> {
        self.rpc
            .request("author_insertKey", json!([key_type, suri, public_key]))
            .await
    }

    async fn set_endpoint(&self, urls: &[String]) -> ChainResult<()> {
        self.rpc
            .request("filecoindot_setRpcEndpoint", json!([urls]))
            .await
    }

    async fn add_relayer(&self, account: &AccountId32) -> ChainResult<TxHash> {
        let call = dynamic::tx(
            self.pallet.as_str(),
            "add_relayer",
            vec![Value::from_bytes(account.0)],
        );
        let call = match self.authority {
            RelayerAuthority::Sudo => dynamic::tx("Sudo", "sudo", vec![call.into_value()]),
            RelayerAuthority::Direct => call,
        };

        let hash = self
            .api
            .tx()
            .sign_and_submit_default(&call, &self.signer)
            .await?;
        tracing::debug!(tx_hash = ?hash, "add_relayer submitted");
        Ok(hash)
    }

    async fn deposit_fund(&self, account: &AccountId32, amount: u128) -> ChainResult<TxHash> {
        let call = dynamic::tx(
            "Balances",
            self.transfer_call.as_str(),
            vec![
                Value::unnamed_variant("Id", [Value::from_bytes(account.0)]),
                Value::u128(amount),
            ],
        );

        let hash = self
            .api
            .tx()
            .sign_and_submit_default(&call, &self.signer)
            .await?;
        tracing::debug!(tx_hash = ?hash, amount, "Transfer submitted");
        Ok(hash)
    }

    async fn verify_proof(&self, proof: &ProofRecord) -> ChainResult<bool> {
        let method = match proof.kind {
            ProofKind::State => "filecoindot_verifyState",
            ProofKind::Receipt => "filecoindot_verifyReceipt",
        };
        self.rpc
            .request(method, json!([proof.proof, proof.cid]))
            .await
    }

    async fn subscribe_events(
        &self,
        sink: mpsc::UnboundedSender<EventBatch>,
    ) -> ChainResult<Subscription> {
        let mut blocks = self.api.blocks().subscribe_best().await?;

        let task = tokio::spawn(async move {
            while let Some(block) = blocks.next().await {
                let block = match block {
                    Ok(block) => block,
                    Err(e) => {
                        tracing::warn!(error = %e, "Block subscription failed");
                        break;
                    }
                };
                let number = u64::from(block.number());

                let events = match block.events().await {
                    Ok(events) => events,
                    Err(e) => {
                        tracing::warn!(block = number, error = %e, "Failed to fetch events");
                        break;
                    }
                };

                let mut records = Vec::new();
                for event in events.iter() {
                    match event {
                        Ok(event) => records.push(EventRecord {
                            section: event.pallet_name().to_string(),
                            method: event.variant_name().to_string(),
                            phase: event.phase().into(),
                            data: event.field_bytes().to_vec(),
                        }),
                        Err(e) => {
                            tracing::warn!(block = number, error = %e, "Skipping undecodable event")
                        }
                    }
                }

                if sink
                    .send(EventBatch {
                        block: number,
                        events: records,
                    })
                    .is_err()
                {
                    break;
                }
            }
            tracing::debug!("Event subscription ended");
        });

        Ok(Subscription::new(task))
    }
}

impl ErrorCatalog for NodeClient {
    fn module_error(&self, pallet_index: u8, error_index: u8) -> Option<ModuleErrorDetails> {
        self.api.metadata().module_error(pallet_index, error_index)
    }
}

impl std::fmt::Debug for NodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeClient")
            .field("rpc", &self.rpc)
            .field("pallet", &self.pallet)
            .field("authority", &self.authority)
            .finish()
    }
}

/// Connects a [`NodeClient`] to the configured endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeConnector;

impl Connect for NodeConnector {
    type Api = NodeClient;

    async fn connect(&self, config: &RunConfig) -> ChainResult<NodeClient> {
        NodeClient::connect(config).await
    }
}
