//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for an e2e run.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Readiness marker printed by the node's offchain worker until an upstream
/// Filecoin endpoint has been configured.
pub const DEFAULT_READY_MARKER: &str = "haven't set filecoin rpc yet";

/// Root configuration for an e2e run.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RunConfig {
    /// Node binary and endpoint settings.
    pub node: NodeConfig,

    /// Author key material inserted into the node keystore.
    pub author: AuthorConfig,

    /// Privileged setup sequence settings.
    pub setup: SetupConfig,

    /// Optional proof verified before any setup step.
    pub proof: Option<ProofRecord>,

    /// Event classification settings.
    pub watch: WatchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Node process and endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Path to the node binary.
    pub binary: String,

    /// WebSocket endpoint of the launched node.
    pub ws: String,

    /// Substring in the node's diagnostic output signalling readiness.
    pub ready_marker: String,

    /// `RUST_LOG` passed to the node process.
    pub rust_log: String,

    /// Seconds to wait after the interrupt signal before force-killing the node.
    pub shutdown_grace_secs: u64,

    /// Timeout for a single RPC round trip in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            binary: "target/release/filecoindot-template".to_string(),
            ws: "ws://127.0.0.1:9944".to_string(),
            ready_marker: DEFAULT_READY_MARKER.to_string(),
            rust_log: "runtime".to_string(),
            shutdown_grace_secs: 5,
            rpc_timeout_secs: 30,
        }
    }
}

/// Author key configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthorConfig {
    /// Four byte key type id (e.g. "fdot").
    pub id: String,

    /// Seed phrase or raw seed the key is derived from.
    pub suri: String,

    /// Public key / account of the author. Derived from `suri` when absent.
    pub address: Option<String>,
}

impl Default for AuthorConfig {
    fn default() -> Self {
        Self {
            id: "fdot".to_string(),
            suri: "brief outside human axis reveal boat warm amateur dish sample enroll moment"
                .to_string(),
            address: Some(
                "0x0676a4b19c66b31e12d15fe31ccbc775d3d2cda6e1c8686e395118f808eaa118".to_string(),
            ),
        }
    }
}

/// Who authorizes the relayer registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RelayerAuthority {
    /// Wrap the call in `Sudo.sudo`.
    #[default]
    Sudo,
    /// Submit the call directly from the signer.
    Direct,
}

/// Setup sequence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SetupConfig {
    /// Upstream Filecoin RPC endpoints handed to the node.
    pub filecoin_rpc: Vec<String>,

    /// Secret URI of the identity signing extrinsics.
    pub signer_uri: String,

    /// Authority model for `add_relayer`.
    pub relayer_authority: RelayerAuthority,

    /// Name of the filecoindot pallet in the runtime.
    pub pallet: String,

    /// Optional funding of the author account.
    pub deposit: Option<DepositConfig>,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            filecoin_rpc: vec!["https://api.node.glif.io".to_string()],
            signer_uri: "//Alice".to_string(),
            relayer_authority: RelayerAuthority::Sudo,
            pallet: "Filecoindot".to_string(),
            deposit: None,
        }
    }
}

/// Funds transferred to the author account before watching.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DepositConfig {
    /// Amount in the chain's smallest unit.
    pub amount: u64,

    /// Balances call used for the transfer.
    #[serde(default = "default_transfer_call")]
    pub transfer_call: String,
}

fn default_transfer_call() -> String {
    "transfer".to_string()
}

/// Which verification RPC a proof is checked with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProofKind {
    #[default]
    State,
    Receipt,
}

/// A proof checked against a CID before setup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProofRecord {
    /// Hex-encoded SCALE proof.
    pub proof: String,

    /// CID the proof is verified against.
    pub cid: String,

    #[serde(default)]
    pub kind: ProofKind,
}

/// Event classification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Event method that marks the run as passed.
    pub success_event: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            success_event: "VoteCasted".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Prometheus listener address; metrics are not exported when unset.
    pub metrics_address: Option<String>,
}
