//! Configuration validation.
//!
//! Serde handles syntax; this pass checks values the node would reject
//! later in the run. All problems are collected, not just the first.

use std::fmt;
use std::net::SocketAddr;
use url::Url;

use crate::chain::signer::parse_account;
use crate::config::schema::RunConfig;

/// A single semantic problem in a [`RunConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &RunConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.node.ws) {
        Ok(url) if matches!(url.scheme(), "ws" | "wss") => {}
        Ok(url) => errors.push(ValidationError::new(
            "node.ws",
            format!("expected ws:// or wss:// scheme, got {}://", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("node.ws", e.to_string())),
    }

    if config.node.binary.is_empty() {
        errors.push(ValidationError::new("node.binary", "must not be empty"));
    }
    if config.node.ready_marker.is_empty() {
        errors.push(ValidationError::new("node.ready_marker", "must not be empty"));
    }
    if config.node.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("node.rpc_timeout_secs", "must be greater than 0"));
    }

    // The node rejects the whole list if any entry is not an http(s) URL.
    if config.setup.filecoin_rpc.is_empty() {
        errors.push(ValidationError::new(
            "setup.filecoin_rpc",
            "at least one endpoint is required",
        ));
    }
    for endpoint in &config.setup.filecoin_rpc {
        let valid = endpoint.starts_with("http") && Url::parse(endpoint).is_ok();
        if !valid {
            errors.push(ValidationError::new(
                "setup.filecoin_rpc",
                format!("invalid endpoint '{}'", endpoint),
            ));
        }
    }

    if config.author.id.len() != 4 {
        errors.push(ValidationError::new(
            "author.id",
            format!("key type id must be 4 bytes, got {}", config.author.id.len()),
        ));
    }
    if config.author.suri.trim().is_empty() {
        errors.push(ValidationError::new("author.suri", "must not be empty"));
    }
    if let Some(address) = &config.author.address {
        if parse_account(address).is_err() {
            errors.push(ValidationError::new(
                "author.address",
                format!("'{}' is neither 32-byte hex nor SS58", address),
            ));
        }
    }
    if config.setup.signer_uri.trim().is_empty() {
        errors.push(ValidationError::new("setup.signer_uri", "must not be empty"));
    }

    if let Some(proof) = &config.proof {
        if proof.proof.is_empty() {
            errors.push(ValidationError::new("proof.proof", "must not be empty"));
        }
        if proof.cid.is_empty() {
            errors.push(ValidationError::new("proof.cid", "must not be empty"));
        }
    }

    if config.watch.success_event.is_empty() {
        errors.push(ValidationError::new("watch.success_event", "must not be empty"));
    }

    if let Some(address) = &config.observability.metrics_address {
        if address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                "observability.metrics_address",
                format!("invalid socket address '{}'", address),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
