//! Node process subsystem.
//!
//! # Data Flow
//! ```text
//! ProcessSupervisor::launch()
//!     → ProcessHandle (owns child, stdout, stderr)
//!     → monitor.rs relay tasks (one per stream)
//!         → own stdout / stderr (verbatim)
//!         → LogSignal::{Ready, Closed} over mpsc → runner
//!
//! Teardown:
//!     runner → ProcessHandle::terminate() → SIGINT → grace period → SIGKILL
//! ```
//!
//! # Design Decisions
//! - Arguments are fixed (`--dev --tmp`); only the binary path is configurable
//! - `terminate()` is idempotent and treats "no such process" as success
//! - `kill_on_drop` backs up the explicit teardown if the runner panics

pub mod monitor;
pub mod supervisor;
pub mod types;

pub use monitor::{contains_marker, LogMonitor, LogSignal, StreamKind};
pub use supervisor::{
    Launch, NodeOutput, OutputStream, ProcessHandle, ProcessSupervisor, Supervised, NODE_ARGS,
};
pub use types::{ProcessError, ProcessResult};
