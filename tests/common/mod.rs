//! Shared test doubles for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncWriteExt, DuplexStream};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;

use filecoindot_e2e::chain::dispatch::lower_camel;
use filecoindot_e2e::chain::{
    AccountId32, ChainApi, ChainError, ChainResult, Connect, ErrorCatalog, EventBatch,
    EventRecord, ModuleErrorDetails, Subscription, TxHash,
};
use filecoindot_e2e::config::{ProofRecord, RunConfig};
use filecoindot_e2e::process::{
    Launch, NodeOutput, OutputStream, ProcessError, ProcessResult, Supervised,
};

pub const READY: &str = "2021-12-01 offchain worker: haven't set filecoin rpc yet\n";

// ---------------------------------------------------------------------------
// Fake node process
// ---------------------------------------------------------------------------

/// Launches a fake node whose stderr replays scripted chunks.
#[derive(Debug, Clone, Default)]
pub struct FakeLauncher {
    pub stderr: Vec<String>,
    /// Close stderr after the script, as a crashing node would.
    pub exit_after_script: bool,
    pub fail_launch: bool,
    pub fail_terminate: bool,
    pub launches: Arc<AtomicUsize>,
    pub terminations: Arc<AtomicUsize>,
}

impl FakeLauncher {
    pub fn with_stderr<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stderr: chunks.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn terminations(&self) -> usize {
        self.terminations.load(Ordering::SeqCst)
    }
}

impl Launch for FakeLauncher {
    type Handle = FakeProcess;

    fn launch(&self) -> ProcessResult<FakeProcess> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail_launch {
            return Err(ProcessError::Spawn {
                binary: "filecoindot-template".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            });
        }

        let (mut stdout_writer, stdout) = tokio::io::duplex(64 * 1024);
        let (mut stderr_writer, stderr) = tokio::io::duplex(64 * 1024);
        let (release, released) = oneshot::channel::<()>();
        let chunks = self.stderr.clone();
        let exit_after_script = self.exit_after_script;

        tokio::spawn(async move {
            let _ = stdout_writer.write_all(b"fake node starting\n").await;
            for chunk in chunks {
                if stderr_writer.write_all(chunk.as_bytes()).await.is_err() {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            if exit_after_script {
                return;
            }
            // Streams stay open until the process is terminated.
            let _ = released.await;
        });

        Ok(FakeProcess {
            stdout: Some(stdout),
            stderr: Some(stderr),
            release: Some(release),
            fail_terminate: self.fail_terminate,
            terminations: self.terminations.clone(),
        })
    }
}

#[derive(Debug)]
pub struct FakeProcess {
    stdout: Option<DuplexStream>,
    stderr: Option<DuplexStream>,
    release: Option<oneshot::Sender<()>>,
    fail_terminate: bool,
    terminations: Arc<AtomicUsize>,
}

impl Supervised for FakeProcess {
    fn take_output(&mut self) -> NodeOutput {
        NodeOutput {
            stdout: self.stdout.take().map(|s| Box::new(s) as OutputStream),
            stderr: self.stderr.take().map(|s| Box::new(s) as OutputStream),
        }
    }

    async fn terminate(&mut self) -> ProcessResult<()> {
        self.terminations.fetch_add(1, Ordering::SeqCst);
        self.release.take();
        if self.fail_terminate {
            return Err(ProcessError::Kill(std::io::Error::other(
                "operation not permitted",
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fake chain
// ---------------------------------------------------------------------------

/// Behaviour of the fake chain.
#[derive(Debug, Clone)]
pub struct ChainScript {
    pub verify_result: bool,
    /// Name of the call that fails with an RPC error.
    pub fail_call: Option<&'static str>,
    pub batches: Vec<EventBatch>,
    /// Drop the event sink after the scripted batches.
    pub close_subscription: bool,
}

impl Default for ChainScript {
    fn default() -> Self {
        Self {
            verify_result: true,
            fail_call: None,
            batches: Vec::new(),
            close_subscription: false,
        }
    }
}

/// Records every call made through the connected [`FakeChain`].
#[derive(Debug, Clone, Default)]
pub struct FakeConnector {
    pub script: ChainScript,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub connects: Arc<AtomicUsize>,
}

impl FakeConnector {
    pub fn new(script: ChainScript) -> Self {
        Self {
            script,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls without the subscription.
    pub fn setup_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call != "subscribe_events")
            .collect()
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl Connect for FakeConnector {
    type Api = FakeChain;

    async fn connect(&self, _config: &RunConfig) -> ChainResult<FakeChain> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(FakeChain {
            script: self.script.clone(),
            calls: self.calls.clone(),
        })
    }
}

#[derive(Debug)]
pub struct FakeChain {
    script: ChainScript,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeChain {
    fn record(&self, call: &'static str) -> ChainResult<()> {
        self.calls.lock().unwrap().push(call.to_string());
        if self.script.fail_call == Some(call) {
            return Err(ChainError::Rpc {
                method: call.to_string(),
                code: -32000,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl ChainApi for FakeChain {
    async fn insert_author_key(&self, _: &str, _: &str, _: &str) -> ChainResult<()> {
        self.record("insert_author_key")
    }

    async fn set_endpoint(&self, _: &[String]) -> ChainResult<()> {
        self.record("set_endpoint")
    }

    async fn add_relayer(&self, _: &AccountId32) -> ChainResult<TxHash> {
        self.record("add_relayer")?;
        Ok(TxHash::repeat_byte(1))
    }

    async fn deposit_fund(&self, _: &AccountId32, _: u128) -> ChainResult<TxHash> {
        self.record("deposit_fund")?;
        Ok(TxHash::repeat_byte(2))
    }

    async fn verify_proof(&self, _: &ProofRecord) -> ChainResult<bool> {
        self.record("verify_proof")?;
        Ok(self.script.verify_result)
    }

    async fn subscribe_events(
        &self,
        sink: mpsc::UnboundedSender<EventBatch>,
    ) -> ChainResult<Subscription> {
        self.record("subscribe_events")?;
        let batches = self.script.batches.clone();
        let close = self.script.close_subscription;
        let task = tokio::spawn(async move {
            for batch in batches {
                if sink.send(batch).is_err() {
                    return;
                }
            }
            if !close {
                std::future::pending::<()>().await;
            }
        });
        Ok(Subscription::new(task))
    }
}

impl ErrorCatalog for FakeChain {
    fn module_error(&self, pallet_index: u8, error_index: u8) -> Option<ModuleErrorDetails> {
        match (pallet_index, error_index) {
            (8, 0) => Some(ModuleErrorDetails {
                section: lower_camel("Filecoindot"),
                method: "RelayerAlreadyExists".to_string(),
                docs: "Relayer already in set".to_string(),
            }),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

pub fn batch(block: u64, events: Vec<EventRecord>) -> EventBatch {
    EventBatch { block, events }
}

pub fn vote_casted() -> EventRecord {
    EventRecord::new("Filecoindot", "VoteCasted", vec![0; 32])
}

pub fn relayer_already_exists() -> EventRecord {
    EventRecord::new("System", "ExtrinsicFailed", vec![3, 8, 0, 0, 0, 0])
}

pub fn extrinsic_success() -> EventRecord {
    EventRecord::new("System", "ExtrinsicSuccess", vec![0; 10])
}

// ---------------------------------------------------------------------------
// Mock JSON-RPC node
// ---------------------------------------------------------------------------

/// Start a WebSocket JSON-RPC server on an ephemeral port.
///
/// `handler` maps each request to the frames sent back, in order.
pub async fn start_mock_node<F>(handler: F) -> String
where
    F: Fn(serde_json::Value) -> Vec<serde_json::Value> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let handler = handler.clone();
            tokio::spawn(async move {
                let Ok(mut socket) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                while let Some(Ok(message)) = socket.next().await {
                    let Message::Text(text) = message else {
                        continue;
                    };
                    let request: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
                    for reply in handler(request) {
                        let frame = Message::Text(reply.to_string().into());
                        if socket.send(frame).await.is_err() {
                            return;
                        }
                    }
                }
            });
        }
    });

    format!("ws://{}", addr)
}

/// A successful response to `request`.
pub fn reply(request: &serde_json::Value, result: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "jsonrpc": "2.0", "id": request["id"], "result": result })
}

/// An interrupt future resolving after `delay`.
pub fn interrupt_after(delay: Duration) -> impl Future<Output = ()> {
    tokio::time::sleep(delay)
}

/// An interrupt future that never resolves.
pub fn no_interrupt() -> impl Future<Output = ()> {
    std::future::pending()
}
