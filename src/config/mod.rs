//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RunConfig (validated, immutable)
//!     → shared via Arc with the runner
//! ```
//!
//! # Design Decisions
//! - Config is loaded once at startup and never mutated
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::RunConfig;
pub use schema::{
    AuthorConfig, DepositConfig, NodeConfig, ObservabilityConfig, ProofKind, ProofRecord,
    RelayerAuthority, SetupConfig, WatchConfig,
};
