//! Run orchestration.
//!
//! # Responsibilities
//! - Own the node process from launch to a single terminate call
//! - Gate the setup sequence on the first readiness marker
//! - Watch chain events until the first terminal outcome
//! - Race the whole run against the interrupt future

use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::Instrument;
use uuid::Uuid;

use crate::chain::{ChainApi, Connect};
use crate::config::RunConfig;
use crate::events::EventWatcher;
use crate::observability::metrics;
use crate::process::{Launch, LogMonitor, LogSignal, StreamKind, Supervised};
use crate::runner::setup::{SetupOutcome, SetupSequence};
use crate::runner::state::{RunState, Stage};
use crate::runner::types::{Completion, RunError};

/// Drives one end-to-end run.
#[derive(Debug)]
pub struct Runner<L, C> {
    config: Arc<RunConfig>,
    launcher: L,
    connector: C,
    state: RunState,
    monitor: LogMonitor,
}

impl<L: Launch, C: Connect> Runner<L, C> {
    pub fn new(config: Arc<RunConfig>, launcher: L, connector: C) -> Self {
        let monitor = LogMonitor::new(&config.node.ready_marker);
        Self {
            config,
            launcher,
            connector,
            state: RunState::new(),
            monitor,
        }
    }

    /// Replace the output monitor, e.g. to stop relaying node output.
    pub fn with_monitor(mut self, monitor: LogMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn stage(&self) -> Stage {
        self.state.stage()
    }

    /// Launch the node, run it to a terminal outcome or `interrupt`, then
    /// terminate it.
    pub async fn run<F>(&self, interrupt: F) -> Result<Completion, RunError>
    where
        F: Future<Output = ()>,
    {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("e2e", %run_id);
        let result = self.run_supervised(interrupt).instrument(span).await;

        let label = match &result {
            Ok(completion) => completion.label(),
            Err(_) => "error",
        };
        metrics::record_run(label);
        result
    }

    async fn run_supervised<F>(&self, interrupt: F) -> Result<Completion, RunError>
    where
        F: Future<Output = ()>,
    {
        let mut process = match self.launcher.launch() {
            Ok(process) => process,
            Err(e) => {
                self.state.terminate();
                tracing::error!(error = %e, "Node launch failed");
                return Err(RunError::Launch(e));
            }
        };

        let result = tokio::select! {
            result = self.drive(&mut process) => result,
            () = interrupt => {
                tracing::info!(stage = ?self.state.stage(), "Interrupt received, shutting down");
                Ok(Completion::Interrupted)
            }
        };

        self.state.terminate();
        match process.terminate().await {
            Ok(()) => {
                match &result {
                    Ok(completion) => tracing::info!(result = completion.label(), "Run finished"),
                    Err(e) => tracing::error!(error = %e, "Run failed"),
                }
                result
            }
            Err(e) => {
                if let Err(prior) = &result {
                    tracing::error!(error = %prior, "Run failed before termination");
                }
                tracing::error!(error = %e, "Node termination failed");
                Err(RunError::Termination(e))
            }
        }
    }

    async fn drive(&self, process: &mut L::Handle) -> Result<Completion, RunError> {
        let output = process.take_output();
        let (signal_tx, mut signals) = mpsc::unbounded_channel();
        if let Some(stdout) = output.stdout {
            self.monitor.spawn(stdout, StreamKind::Standard, signal_tx.clone());
        }
        if let Some(stderr) = output.stderr {
            self.monitor.spawn(stderr, StreamKind::Diagnostic, signal_tx.clone());
        }
        // The channel closes once both relay tasks finish.
        drop(signal_tx);

        self.state.transition(Stage::Launching, Stage::WaitingReady);
        tracing::info!(marker = self.monitor.marker(), "Waiting for node readiness");
        self.wait_ready(&mut signals).await?;

        tracing::info!("Node ready, starting setup");
        let api = self.connector.connect(&self.config).await?;

        // Subscribe before any extrinsic is submitted so no block is missed.
        let (batch_tx, mut batches) = mpsc::unbounded_channel();
        let _subscription = api.subscribe_events(batch_tx).await?;

        let setup = SetupSequence::new(&self.config).execute(&api).await?;
        if let SetupOutcome::Rejected(reason) = setup {
            // The subscription opened above is dropped unread.
            return Ok(Completion::Failed(reason));
        }

        self.state.transition(Stage::SettingUp, Stage::Watching);
        tracing::info!(
            success_event = %self.config.watch.success_event,
            "Setup complete, watching events"
        );

        let watcher = EventWatcher::new(&self.config.watch.success_event);
        let mut signals_open = true;
        loop {
            tokio::select! {
                batch = batches.recv() => {
                    let Some(batch) = batch else {
                        return Err(RunError::SubscriptionClosed);
                    };
                    tracing::debug!(block = batch.block, events = batch.events.len(), "Block events received");
                    for event in &batch.events {
                        if let Some(completion) = watcher
                            .observe(event, &api)
                            .and_then(Completion::from_outcome)
                        {
                            return Ok(completion);
                        }
                    }
                }
                signal = signals.recv(), if signals_open => match signal {
                    Some(LogSignal::Ready) => {
                        if !self.state.try_begin_setup() {
                            tracing::debug!("Repeated readiness marker ignored");
                        }
                    }
                    Some(LogSignal::Closed(StreamKind::Diagnostic)) => {
                        return Err(RunError::NodeExited("a terminal event"));
                    }
                    Some(LogSignal::Closed(StreamKind::Standard)) => {}
                    None => signals_open = false,
                },
            }
        }
    }

    async fn wait_ready(
        &self,
        signals: &mut mpsc::UnboundedReceiver<LogSignal>,
    ) -> Result<(), RunError> {
        while let Some(signal) = signals.recv().await {
            match signal {
                LogSignal::Ready => {
                    if self.state.try_begin_setup() {
                        return Ok(());
                    }
                    tracing::debug!("Readiness marker ignored");
                }
                LogSignal::Closed(StreamKind::Diagnostic) => break,
                LogSignal::Closed(StreamKind::Standard) => {}
            }
        }
        Err(RunError::NodeExited("becoming ready"))
    }
}

/// Run only the setup sequence against a node that is already running.
pub async fn run_setup<C: Connect>(config: &RunConfig, connector: &C) -> Result<Completion, RunError> {
    let api = connector.connect(config).await?;
    let completion = match SetupSequence::new(config).execute(&api).await? {
        SetupOutcome::Completed => Completion::Passed,
        SetupOutcome::Rejected(reason) => Completion::Failed(reason),
    };
    tracing::info!(result = completion.label(), "Setup finished");
    metrics::record_run(completion.label());
    Ok(completion)
}
