//! Dispatch error extraction and metadata lookup.
//!
//! # Data Flow
//! ```text
//! EventRecord (System.ExtrinsicFailed / Sudo.Sudid / Sudo.SudoAsDone)
//!     → first field bytes → DispatchError (or undecoded payload)
//!     → Module { pallet, error } → ErrorCatalog (runtime metadata)
//!     → ModuleErrorDetails { section, method, docs }
//! ```

use std::fmt;

use crate::chain::types::EventRecord;

/// Dispatch failure carried in the first field of an error event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// A pallet-defined error, resolvable against metadata.
    Module { pallet_index: u8, error_index: u8 },
    /// Any non-module variant, by name.
    Other(&'static str),
}

/// Variant names of `sp_runtime::DispatchError`, by encoded index.
const DISPATCH_VARIANTS: [&str; 15] = [
    "Other",
    "CannotLookup",
    "BadOrigin",
    "Module",
    "ConsumerRemaining",
    "NoProviders",
    "TooManyConsumers",
    "Token",
    "Arithmetic",
    "Transactional",
    "Exhausted",
    "Corruption",
    "Unavailable",
    "RootNotAllowed",
    "Trie",
];

const MODULE_VARIANT: u8 = 3;

impl DispatchError {
    /// Decode a SCALE `DispatchError` prefix.
    ///
    /// Only the pallet index and the first error byte are read, which covers
    /// both the legacy `error: u8` and the current `error: [u8; 4]` layouts.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let (&variant, rest) = bytes.split_first()?;
        if variant == MODULE_VARIANT {
            return match rest {
                [pallet_index, error_index, ..] => Some(Self::Module {
                    pallet_index: *pallet_index,
                    error_index: *error_index,
                }),
                _ => None,
            };
        }
        DISPATCH_VARIANTS.get(variant as usize).copied().map(Self::Other)
    }
}

/// Encoded dispatch error carried by a failure event, `None` for any other event.
///
/// Every `System.ExtrinsicFailed` and every `Err` result of `Sudo.Sudid` /
/// `Sudo.SudoAsDone` yields a payload, even one that does not decode.
pub fn dispatch_error_payload(event: &EventRecord) -> Option<&[u8]> {
    match (event.section.as_str(), event.method.as_str()) {
        ("System", "ExtrinsicFailed") => Some(&event.data),
        // First field is `Result<(), DispatchError>`; 0x01 marks `Err`.
        ("Sudo", "Sudid") | ("Sudo", "SudoAsDone") => match event.data.split_first() {
            Some((&1, rest)) => Some(rest),
            _ => None,
        },
        _ => None,
    }
}

/// Decoded dispatch error of a failure event.
///
/// The outer `None` means the event carries no error; the inner `None` means
/// it does but the payload could not be decoded.
pub fn first_field_dispatch_error(event: &EventRecord) -> Option<Option<DispatchError>> {
    dispatch_error_payload(event).map(DispatchError::decode)
}

/// Human-readable description of a module error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleErrorDetails {
    /// Pallet name in lower camel case, e.g. `filecoindot`.
    pub section: String,
    /// Error variant, e.g. `RelayerAlreadyExists`.
    pub method: String,
    pub docs: String,
}

impl fmt::Display for ModuleErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section, self.method)?;
        if !self.docs.is_empty() {
            write!(f, ": {}", self.docs)?;
        }
        Ok(())
    }
}

/// Resolves module errors to names and documentation.
pub trait ErrorCatalog {
    fn module_error(&self, pallet_index: u8, error_index: u8) -> Option<ModuleErrorDetails>;
}

impl ErrorCatalog for subxt::Metadata {
    fn module_error(&self, pallet_index: u8, error_index: u8) -> Option<ModuleErrorDetails> {
        let pallet = self.pallet_by_index(pallet_index)?;
        let variant = pallet.error_variant_by_index(error_index)?;
        Some(ModuleErrorDetails {
            section: lower_camel(pallet.name()),
            method: variant.name.clone(),
            docs: variant
                .docs
                .iter()
                .map(|line| line.trim())
                .collect::<Vec<_>>()
                .join(" "),
        })
    }
}

/// `Filecoindot` → `filecoindot`, `TransactionPayment` → `transactionPayment`.
pub fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
