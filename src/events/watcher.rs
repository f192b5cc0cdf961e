//! Event classification.
//!
//! # Responsibilities
//! - Classify each event as transient, failure or success
//! - Decode dispatch errors into a readable reason
//! - Settle on the first terminal classification and ignore the rest

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use crate::chain::dispatch::{
    dispatch_error_payload, DispatchError, ErrorCatalog, ModuleErrorDetails,
};
use crate::chain::types::EventRecord;
use crate::observability::metrics;

/// Why a run failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailReason {
    /// A module error resolved against runtime metadata.
    Module(ModuleErrorDetails),
    /// A module error the metadata does not describe.
    UnknownModule { pallet_index: u8, error_index: u8 },
    /// A non-module dispatch error (e.g. `BadOrigin`).
    Dispatch(&'static str),
    /// A failure event whose dispatch error could not be decoded.
    Undecoded {
        section: String,
        method: String,
        payload: String,
    },
    /// The configured proof did not verify against its CID.
    ProofRejected { cid: String },
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailReason::Module(details) => write!(f, "{}", details),
            FailReason::UnknownModule {
                pallet_index,
                error_index,
            } => write!(f, "module error {} in pallet {}", error_index, pallet_index),
            FailReason::Dispatch(name) => write!(f, "dispatch error: {}", name),
            FailReason::Undecoded {
                section,
                method,
                payload,
            } => write!(f, "{}.{} with undecodable error 0x{}", section, method, payload),
            FailReason::ProofRejected { cid } => {
                write!(f, "proof verification returned false for {}", cid)
            }
        }
    }
}

/// Result of classifying a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Transient,
    Failure(FailReason),
    Success,
}

impl Classification {
    fn label(&self) -> &'static str {
        match self {
            Classification::Transient => "transient",
            Classification::Failure(_) => "failure",
            Classification::Success => "success",
        }
    }
}

/// State of a watched run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pending,
    Pass,
    Fail(FailReason),
}

/// Classifies events until the first terminal outcome.
#[derive(Debug)]
pub struct EventWatcher {
    success_event: String,
    outcome: OnceLock<Outcome>,
    classified: AtomicU64,
}

impl EventWatcher {
    pub fn new(success_event: &str) -> Self {
        Self {
            success_event: success_event.to_string(),
            outcome: OnceLock::new(),
            classified: AtomicU64::new(0),
        }
    }

    /// Classify one event without touching the watcher's state.
    pub fn classify(&self, event: &EventRecord, catalog: &dyn ErrorCatalog) -> Classification {
        if let Some(payload) = dispatch_error_payload(event) {
            let reason = match DispatchError::decode(payload) {
                Some(DispatchError::Module {
                    pallet_index,
                    error_index,
                }) => catalog
                    .module_error(pallet_index, error_index)
                    .map(FailReason::Module)
                    .unwrap_or(FailReason::UnknownModule {
                        pallet_index,
                        error_index,
                    }),
                Some(DispatchError::Other(name)) => FailReason::Dispatch(name),
                None => FailReason::Undecoded {
                    section: event.section.clone(),
                    method: event.method.clone(),
                    payload: hex::encode(payload),
                },
            };
            return Classification::Failure(reason);
        }

        if event.method == self.success_event {
            return Classification::Success;
        }
        Classification::Transient
    }

    /// Feed one event. Returns the outcome the first time it becomes terminal.
    ///
    /// Once terminal, later events are not classified.
    pub fn observe(&self, event: &EventRecord, catalog: &dyn ErrorCatalog) -> Option<Outcome> {
        if self.outcome.get().is_some() {
            return None;
        }

        self.classified.fetch_add(1, Ordering::Relaxed);
        let classification = self.classify(event, catalog);
        metrics::record_event(classification.label());
        tracing::debug!(
            section = %event.section,
            method = %event.method,
            phase = ?event.phase,
            classification = classification.label(),
            "Event observed"
        );

        let outcome = match classification {
            Classification::Transient => return None,
            Classification::Success => Outcome::Pass,
            Classification::Failure(reason) => {
                tracing::error!(reason = %reason, "Dispatch error observed");
                Outcome::Fail(reason)
            }
        };

        // Only the first terminal outcome wins.
        self.outcome.set(outcome.clone()).ok().map(|()| outcome)
    }

    /// Current outcome; `Pending` until a terminal event was observed.
    pub fn outcome(&self) -> Outcome {
        self.outcome.get().cloned().unwrap_or(Outcome::Pending)
    }

    /// Number of events classified so far.
    pub fn classified(&self) -> u64 {
        self.classified.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::dispatch::lower_camel;

    struct Catalog;

    impl ErrorCatalog for Catalog {
        fn module_error(&self, pallet_index: u8, error_index: u8) -> Option<ModuleErrorDetails> {
            match (pallet_index, error_index) {
                (8, 0) => Some(ModuleErrorDetails {
                    section: lower_camel("Filecoindot"),
                    method: "RelayerAlreadyExists".to_string(),
                    docs: "Relayer already in set".to_string(),
                }),
                _ => None,
            }
        }
    }

    fn relayer_exists() -> EventRecord {
        EventRecord::new("System", "ExtrinsicFailed", vec![3, 8, 0, 0, 0, 0])
    }

    fn vote_casted() -> EventRecord {
        EventRecord::new("Filecoindot", "VoteCasted", vec![0, 1, 2])
    }

    #[test]
    fn test_module_error_fails_with_decoded_reason() {
        let watcher = EventWatcher::new("VoteCasted");
        let outcome = watcher.observe(&relayer_exists(), &Catalog).unwrap();
        match outcome {
            Outcome::Fail(reason) => assert_eq!(
                reason.to_string(),
                "filecoindot.RelayerAlreadyExists: Relayer already in set"
            ),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_success_event_passes() {
        let watcher = EventWatcher::new("VoteCasted");
        assert_eq!(watcher.observe(&vote_casted(), &Catalog), Some(Outcome::Pass));
        assert_eq!(watcher.outcome(), Outcome::Pass);
    }

    #[test]
    fn test_transient_events_stay_pending() {
        let watcher = EventWatcher::new("VoteCasted");
        let events = [
            EventRecord::new("System", "ExtrinsicSuccess", vec![]),
            EventRecord::new("Filecoindot", "RelayerAdded", vec![0; 32]),
            EventRecord::new("Sudo", "Sudid", vec![0]),
        ];
        for event in &events {
            assert_eq!(watcher.observe(event, &Catalog), None);
        }
        assert_eq!(watcher.outcome(), Outcome::Pending);
        assert_eq!(watcher.classified(), 3);
    }

    #[test]
    fn test_terminal_state_is_exclusive() {
        let watcher = EventWatcher::new("VoteCasted");
        assert_eq!(watcher.observe(&vote_casted(), &Catalog), Some(Outcome::Pass));

        assert_eq!(watcher.observe(&relayer_exists(), &Catalog), None);
        assert_eq!(watcher.observe(&vote_casted(), &Catalog), None);
        assert_eq!(watcher.outcome(), Outcome::Pass);
        assert_eq!(watcher.classified(), 1);
    }

    #[test]
    fn test_unknown_module_and_other_errors() {
        let watcher = EventWatcher::new("VoteCasted");
        let unknown = EventRecord::new("System", "ExtrinsicFailed", vec![3, 9, 4, 0, 0, 0]);
        assert_eq!(
            watcher.classify(&unknown, &Catalog),
            Classification::Failure(FailReason::UnknownModule {
                pallet_index: 9,
                error_index: 4
            })
        );

        let bad_origin = EventRecord::new("Sudo", "Sudid", vec![1, 2]);
        assert_eq!(
            watcher.classify(&bad_origin, &Catalog),
            Classification::Failure(FailReason::Dispatch("BadOrigin"))
        );
    }

    #[test]
    fn test_undecodable_failures_are_terminal() {
        let watcher = EventWatcher::new("VoteCasted");
        let unknown_variant = EventRecord::new("System", "ExtrinsicFailed", vec![15, 0, 0, 0]);
        match watcher.observe(&unknown_variant, &Catalog) {
            Some(Outcome::Fail(reason)) => {
                assert_eq!(
                    reason.to_string(),
                    "System.ExtrinsicFailed with undecodable error 0x0f000000"
                );
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        let watcher = EventWatcher::new("VoteCasted");
        let truncated_module = EventRecord::new("Sudo", "Sudid", vec![1, 3, 8]);
        assert_eq!(
            watcher.observe(&truncated_module, &Catalog),
            Some(Outcome::Fail(FailReason::Undecoded {
                section: "Sudo".to_string(),
                method: "Sudid".to_string(),
                payload: "0308".to_string(),
            }))
        );
        assert!(matches!(watcher.outcome(), Outcome::Fail(_)));
    }

    #[test]
    fn test_trie_error_is_a_failure() {
        let watcher = EventWatcher::new("VoteCasted");
        let trie = EventRecord::new("System", "ExtrinsicFailed", vec![14, 0, 0, 0]);
        assert_eq!(
            watcher.observe(&trie, &Catalog),
            Some(Outcome::Fail(FailReason::Dispatch("Trie")))
        );
    }
}
