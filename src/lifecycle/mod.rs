//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → interrupt future → raced against the run
//!     → runner terminates the node → exit 0
//! ```
//!
//! # Design Decisions
//! - The interrupt is a future handed to the runner, not a global hook
//! - Teardown happens in the runner, at a single call site

pub mod signals;

pub use signals::interrupt;
