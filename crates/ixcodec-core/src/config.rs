//! Configuration structures for ixcodec-core.
//!
//! Configuration is explicit and owned by the caller. The core crate never
//! reads environment variables; binaries decide how to populate these values.

use crate::errors::{CodecError, CodecResult};

/// Global configuration container.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    pub hashing: HashingConfig,
    pub limits: LimitsConfig,
    /// Initial capacity of the per-call encode scratch buffer.
    pub encode_buffer_capacity: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            hashing: HashingConfig::default(),
            limits: LimitsConfig::default(),
            encode_buffer_capacity: 1000,
        }
    }
}

/// Discriminator hashing configuration.
#[derive(Debug, Clone)]
pub struct HashingConfig {
    /// Namespace prefixed to snake_case instruction names.
    pub instruction_namespace: String,
    /// Namespace prefixed to account type names.
    pub account_namespace: String,
    /// Number of digest bytes kept as a discriminator.
    pub discriminator_len: usize,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            instruction_namespace: crate::domain::INSTRUCTION.to_string(),
            account_namespace: crate::domain::ACCOUNT.to_string(),
            discriminator_len: crate::defaults::DISCRIMINATOR_LEN,
        }
    }
}

/// Resource limits applied while decoding untrusted bytes.
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Maximum nesting of defined types while decoding.
    pub max_depth: usize,
    /// Maximum accepted input length for a single decode call.
    pub max_input_len: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_input_len: 10 * 1024 * 1024,
        }
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &CodecConfig) -> CodecResult<()> {
    if cfg.limits.max_depth == 0 {
        return Err(CodecError::invalid_config(
            "max_depth must be greater than zero",
        ));
    }

    if cfg.hashing.discriminator_len == 0 || cfg.hashing.discriminator_len > 32 {
        return Err(CodecError::invalid_config(
            "discriminator_len must be within 1..=32",
        ));
    }

    if cfg.hashing.instruction_namespace.is_empty() || cfg.hashing.account_namespace.is_empty() {
        return Err(CodecError::invalid_config(
            "hashing namespaces must not be empty",
        ));
    }

    Ok(())
}
