//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! runner, watcher, supervisor produce:
//!     → logging.rs (structured log events, run_id span)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → operator terminal (stderr; node output is relayed alongside)
//!     → optional Prometheus scrape endpoint
//! ```

pub mod logging;
pub mod metrics;
