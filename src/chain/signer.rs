//! Key derivation and account parsing.
//!
//! # Security
//! - Secret URIs come from the run configuration only
//! - Secrets are never logged; only public keys are

use std::str::FromStr;
use subxt_signer::sr25519::Keypair;
use subxt_signer::SecretUri;

use crate::chain::types::{AccountId32, ChainError, ChainResult};

/// Derive an sr25519 keypair from a seed phrase, raw seed or dev URI.
pub fn keypair_from_uri(suri: &str) -> ChainResult<Keypair> {
    let uri = SecretUri::from_str(suri)
        .map_err(|e| ChainError::Signer(format!("Invalid secret URI: {}", e)))?;
    Keypair::from_uri(&uri).map_err(|e| ChainError::Signer(format!("Key derivation failed: {}", e)))
}

/// `0x`-prefixed hex public key of the key derived from `suri`.
pub fn public_key_hex(suri: &str) -> ChainResult<String> {
    let keypair = keypair_from_uri(suri)?;
    Ok(format!("0x{}", hex::encode(keypair.public_key().0)))
}

/// Parse a 32-byte hex public key (with or without `0x`) or an SS58 address.
pub fn parse_account(address: &str) -> ChainResult<AccountId32> {
    let hex_part = address.strip_prefix("0x").unwrap_or(address);
    if hex_part.len() == 64 {
        let bytes = hex::decode(hex_part).map_err(|_| ChainError::Account(address.to_string()))?;
        let raw: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ChainError::Account(address.to_string()))?;
        return Ok(AccountId32::from(raw));
    }

    AccountId32::from_str(address).map_err(|_| ChainError::Account(address.to_string()))
}

/// Public key hex and account of the author.
///
/// Uses the configured address when present, otherwise derives it from `suri`.
pub fn author_identity(address: Option<&str>, suri: &str) -> ChainResult<(String, AccountId32)> {
    let public = match address {
        Some(address) => {
            let account = parse_account(address)?;
            return Ok((format!("0x{}", hex::encode(account.0)), account));
        }
        None => public_key_hex(suri)?,
    };
    let account = parse_account(&public)?;
    Ok((public, account))
}

#[cfg(test)]
mod tests {
    use super::*;

    // sr25519 public key of the well-known `//Alice` dev account.
    const ALICE_PUBLIC: &str = "0xd43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d";
    const ALICE_SS58: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";

    #[test]
    fn test_public_key_from_dev_uri() {
        assert_eq!(public_key_hex("//Alice").unwrap(), ALICE_PUBLIC);
    }

    #[test]
    fn test_parse_hex_and_ss58_agree() {
        let from_hex = parse_account(ALICE_PUBLIC).unwrap();
        let from_ss58 = parse_account(ALICE_SS58).unwrap();
        assert_eq!(from_hex, from_ss58);

        let without_prefix = parse_account(ALICE_PUBLIC.trim_start_matches("0x")).unwrap();
        assert_eq!(from_hex, without_prefix);
    }

    #[test]
    fn test_invalid_account() {
        let err = parse_account("0x1234").unwrap_err();
        assert!(err.to_string().contains("invalid account"));
    }

    #[test]
    fn test_author_identity_prefers_configured_address() {
        let (public, _) = author_identity(Some(ALICE_SS58), "//Bob").unwrap();
        assert_eq!(public, ALICE_PUBLIC);

        let (public, account) = author_identity(None, "//Alice").unwrap();
        assert_eq!(public, ALICE_PUBLIC);
        assert_eq!(account, parse_account(ALICE_SS58).unwrap());
    }
}
