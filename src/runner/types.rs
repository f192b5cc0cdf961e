//! Run results, error taxonomy and exit codes.

use thiserror::Error;

use crate::chain::ChainError;
use crate::config::ConfigError;
use crate::events::{FailReason, Outcome};
use crate::process::ProcessError;

/// Process exit codes.
pub mod exit_code {
    pub const PASS: u8 = 0;
    pub const FAIL: u8 = 1;
    pub const TERMINATION: u8 = 2;
    pub const LAUNCH: u8 = 3;
    pub const CHAIN: u8 = 4;
    pub const CONFIG: u8 = 5;
}

/// How a run ended without a fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The success event was observed.
    Passed,
    /// A dispatch error was observed or an assertion failed.
    Failed(FailReason),
    /// The operator interrupted the run.
    Interrupted,
}

impl Completion {
    pub fn exit_code(&self) -> u8 {
        match self {
            Completion::Passed | Completion::Interrupted => exit_code::PASS,
            Completion::Failed(_) => exit_code::FAIL,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Completion::Passed => "pass",
            Completion::Failed(_) => "fail",
            Completion::Interrupted => "interrupted",
        }
    }

    /// Map a terminal watcher outcome. `Pending` is not terminal.
    pub fn from_outcome(outcome: Outcome) -> Option<Self> {
        match outcome {
            Outcome::Pending => None,
            Outcome::Pass => Some(Completion::Passed),
            Outcome::Fail(reason) => Some(Completion::Failed(reason)),
        }
    }
}

/// Fatal errors; each class exits with its own code.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to launch node: {0}")]
    Launch(#[source] ProcessError),

    #[error("node output closed before {0}")]
    NodeExited(&'static str),

    #[error("chain call failed: {0}")]
    Chain(#[from] ChainError),

    #[error("event subscription closed before a terminal event")]
    SubscriptionClosed,

    #[error("failed to terminate node: {0}")]
    Termination(#[source] ProcessError),
}

impl RunError {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Config(_) => exit_code::CONFIG,
            RunError::Launch(_) | RunError::NodeExited(_) => exit_code::LAUNCH,
            RunError::Chain(_) | RunError::SubscriptionClosed => exit_code::CHAIN,
            RunError::Termination(_) => exit_code::TERMINATION,
        }
    }
}
