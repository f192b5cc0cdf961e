//! filecoindot-e2e
//!
//! Launches a development node, configures it once it is ready, and watches
//! chain events until the relayer vote succeeds or a dispatch error appears.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────┐  stdout/stderr   ┌────────────┐  Ready   ┌──────────┐
//!   │ node --dev   │─────────────────▶│ LogMonitor │─────────▶│  Runner  │
//!   │    --tmp     │                  └────────────┘          │          │
//!   │              │◀──── JSON-RPC / extrinsics ──────────────│  setup   │
//!   │              │───── block events ──────────────────────▶│  watch   │
//!   └──────────────┘◀──── SIGINT / SIGKILL (once) ────────────│          │
//!                                                             └──────────┘
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use filecoindot_e2e::chain::NodeConnector;
use filecoindot_e2e::config::{load_config, RunConfig};
use filecoindot_e2e::lifecycle;
use filecoindot_e2e::observability::{logging, metrics};
use filecoindot_e2e::process::ProcessSupervisor;
use filecoindot_e2e::runner::{run_setup, Completion, RunError, Runner};

#[derive(Parser)]
#[command(name = "filecoindot-e2e")]
#[command(about = "End-to-end runner for the filecoindot node", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Launch the node, set it up and watch events (default)
    Run,
    /// Set up an already running node, then exit
    Setup,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();

    tracing::info!("filecoindot-e2e v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match cli.config.as_deref() {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => return report(Err(RunError::Config(e))),
        },
        None => RunConfig::default(),
    };

    tracing::info!(
        binary = %config.node.binary,
        ws = %config.node.ws,
        proof = config.proof.is_some(),
        success_event = %config.watch.success_event,
        "Configuration loaded"
    );

    if let Some(address) = &config.observability.metrics_address {
        match address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(metrics_address = %address, "Failed to parse metrics address"),
        }
    }

    let config = Arc::new(config);
    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let launcher = ProcessSupervisor::new(&config.node);
            Runner::new(config, launcher, NodeConnector)
                .run(lifecycle::interrupt())
                .await
        }
        Commands::Setup => {
            tokio::select! {
                result = run_setup(&config, &NodeConnector) => result,
                () = lifecycle::interrupt() => Ok(Completion::Interrupted),
            }
        }
    };

    report(result)
}

/// Print the outcome and map it to the process exit code.
fn report(result: Result<Completion, RunError>) -> ExitCode {
    let code = match result {
        Ok(Completion::Failed(reason)) => {
            eprintln!("FAIL: {}", reason);
            Completion::Failed(reason).exit_code()
        }
        Ok(completion) => {
            eprintln!("{}", completion.label().to_uppercase());
            completion.exit_code()
        }
        Err(e) => {
            eprintln!("ERROR: {}", e);
            e.exit_code()
        }
    };
    ExitCode::from(code)
}
