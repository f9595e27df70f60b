//! Error taxonomy for ixcodec-core.
//!
//! Errors fall into three groups:
//! - configuration errors, raised while a coder is being built from an IDL;
//!   no partially built coder survives them
//! - lookup misses, raised per call for unknown instruction/account/type names
//! - malformed input, raised per call when bytes or values do not fit a layout
//!
//! A decode whose discriminator matches no instruction is not an error at all:
//! it is reported as `Ok(None)` by the coders.

use thiserror::Error;

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug, Error)]
pub enum CodecError {
    // Configuration
    #[error("unresolved type: {0}")]
    UnresolvedType(String),

    #[error("unsupported recursive type: {0}")]
    RecursiveType(String),

    #[error("discriminator length mismatch: {name} has {actual} bytes, expected {expected}")]
    DiscriminatorLength {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate discriminator {discriminator} shared by {first} and {second}")]
    DuplicateDiscriminator {
        discriminator: String,
        first: String,
        second: String,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    // Lookup misses
    #[error("unknown instruction: {0}")]
    UnknownInstruction(String),

    #[error("unknown account: {0}")]
    UnknownAccount(String),

    #[error("unknown type: {0}")]
    UnknownType(String),

    // Malformed input
    #[error("malformed input: {0}")]
    Malformed(String),

    #[error("invalid {kind} tag {tag} (expected < {max})")]
    InvalidTag {
        kind: &'static str,
        tag: u8,
        max: usize,
    },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("nesting depth exceeds limit of {0}")]
    DepthExceeded(usize),

    #[error("invalid {encoding} text: {message}")]
    InvalidEncoding {
        encoding: &'static str,
        message: String,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Returns true for errors raised while building a coder.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnresolvedType(_)
                | Self::RecursiveType(_)
                | Self::DiscriminatorLength { .. }
                | Self::DuplicateDiscriminator { .. }
                | Self::InvalidConfig(_)
        )
    }
}

impl From<std::io::Error> for CodecError {
    fn from(e: std::io::Error) -> Self {
        // borsh reports short reads and invalid primitive bytes through io::Error.
        Self::Malformed(e.to_string())
    }
}
