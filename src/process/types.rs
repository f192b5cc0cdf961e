//! Process supervision errors.

use thiserror::Error;

/// Errors raised while launching or stopping the node.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The binary is missing or could not be executed.
    #[error("failed to spawn '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// Signalling the process failed for a reason other than "no such process".
    #[cfg(unix)]
    #[error("failed to signal node process: {0}")]
    Signal(nix::errno::Errno),

    /// Waiting for the process to exit failed.
    #[error("failed to wait for node process: {0}")]
    Wait(#[source] std::io::Error),

    /// Force-killing the process failed.
    #[error("failed to kill node process: {0}")]
    Kill(#[source] std::io::Error),
}

/// Result type for process operations.
pub type ProcessResult<T> = Result<T, ProcessError>;
