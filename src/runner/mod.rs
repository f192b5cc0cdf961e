//! End-to-end run orchestration.
//!
//! # Data Flow
//! ```text
//! Launch::launch() → ProcessHandle
//!     → LogMonitor (stdout, stderr) → LogSignal::Ready
//!     → RunState CAS WaitingReady → SettingUp (once)
//!     → Connect::connect() → ChainApi
//!     → SetupSequence (verify proof, insert key, set endpoint, add relayer, deposit)
//!     → EventWatcher over EventBatch stream → Completion
//!     → ProcessHandle::terminate() (single call site)
//! ```
//!
//! # Design Decisions
//! - The run is raced against an interrupt future; both paths share teardown
//! - Fatal errors carry their own exit code class

pub mod orchestrator;
pub mod setup;
pub mod state;
pub mod types;

pub use orchestrator::{run_setup, Runner};
pub use setup::{SetupOutcome, SetupSequence, SetupStep};
pub use state::{RunState, Stage};
pub use types::{exit_code, Completion, RunError};
