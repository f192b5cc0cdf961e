//! End-to-end test harness for a Filecoin bridge Substrate node.

pub mod chain;
pub mod config;
pub mod events;
pub mod lifecycle;
pub mod observability;
pub mod process;
pub mod runner;

pub use config::schema::RunConfig;
pub use runner::{Completion, RunError, Runner};
