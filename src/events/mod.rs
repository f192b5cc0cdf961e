//! Chain event watching.
//!
//! # Data Flow
//! ```text
//! ChainApi::subscribe_events → EventBatch (per block) over mpsc
//!     → runner loop → EventWatcher::observe (per event)
//!     → Classification { Transient | Failure | Success }
//!     → Outcome { Pending → Pass | Fail } (set once)
//! ```

pub mod watcher;

pub use watcher::{Classification, EventWatcher, FailReason, Outcome};
