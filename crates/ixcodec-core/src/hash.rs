//! Discriminator hashing.
//!
//! Discriminators are prefixes of a SHA-256 digest over a namespaced preimage:
//! - instructions: `"<namespace>:<snake_case(name)>"`
//! - accounts: `"<namespace>:<Name>"`
//!
//! The namespaces and the prefix length come from [`HashingConfig`]; the
//! defaults match Anchor programs (`global`, `account`, 8 bytes).

use sha2::{Digest, Sha256};

use crate::case::snake_case;
use crate::config::HashingConfig;

/// SHA-256 of raw bytes.
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut h = Sha256::new();
    h.update(bytes);
    h.finalize().into()
}

/// First `len` bytes of SHA-256(`"<namespace>:<name>"`).
///
/// `len` is clamped to the digest size.
pub fn namespaced_prefix(namespace: &str, name: &str, len: usize) -> Vec<u8> {
    let preimage = format!("{namespace}:{name}");
    let digest = sha256(preimage.as_bytes());
    digest[..len.min(digest.len())].to_vec()
}

/// Hash-derived instruction discriminator ("sighash").
pub fn sighash(cfg: &HashingConfig, instruction_name: &str) -> Vec<u8> {
    namespaced_prefix(
        &cfg.instruction_namespace,
        &snake_case(instruction_name),
        cfg.discriminator_len,
    )
}

/// Hash-derived account discriminator. The account name is used verbatim.
pub fn account_discriminator(cfg: &HashingConfig, account_name: &str) -> Vec<u8> {
    namespaced_prefix(&cfg.account_namespace, account_name, cfg.discriminator_len)
}

/// Printable lookup key for a discriminator.
pub fn discriminator_key(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sighash_matches_anchor_initialize() {
        // sha256("global:initialize")[..8]
        let d = sighash(&HashingConfig::default(), "initialize");
        assert_eq!(hex::encode(d), "afaf6d1f0d989bed");
    }

    #[test]
    fn sighash_snake_cases_the_name() {
        let cfg = HashingConfig::default();
        assert_eq!(sighash(&cfg, "setAuthority"), sighash(&cfg, "set_authority"));
        assert_eq!(
            sighash(&cfg, "setAuthority"),
            namespaced_prefix("global", "set_authority", 8)
        );
    }

    #[test]
    fn account_discriminator_uses_name_verbatim() {
        let cfg = HashingConfig::default();
        assert_eq!(
            account_discriminator(&cfg, "Counter"),
            namespaced_prefix("account", "Counter", 8)
        );
        assert_ne!(
            account_discriminator(&cfg, "Counter"),
            account_discriminator(&cfg, "counter")
        );
    }

    #[test]
    fn prefix_is_clamped() {
        assert_eq!(namespaced_prefix("global", "x", 64).len(), 32);
    }
}
