//! ixcodec-core
//!
//! Schema-driven binary instruction codec for Anchor-style IDLs:
//! - IDL data model (instructions, account trees, defined types)
//! - Layout compiler producing Borsh layouts for every instruction
//! - Discriminator table (explicit bytes or `sha256("global:<name>")[..8]`)
//! - Instruction, account and named-type coders
//! - Formatter rendering decoded instructions for display
//! - Type-directed JSON conversion

pub mod case;
pub mod coder;
pub mod config;
pub mod errors;
pub mod format;
pub mod hash;
pub mod idl;
pub mod json;
pub mod layout;
pub mod value;

pub use crate::errors::{CodecError, CodecResult};

/// Hash namespaces for derived discriminators.
/// These must remain stable; programs on chain depend on them.
pub mod domain {
    pub const INSTRUCTION: &str = "global";
    pub const ACCOUNT: &str = "account";
}

pub mod defaults {
    /// Bytes of digest kept as a derived discriminator.
    pub const DISCRIMINATOR_LEN: usize = 8;
}

/// Convenience re-exports.
pub mod prelude {
    pub use crate::coder::{
        AccountsCoder, BorshCoder, DataEncoding, DiscriminatorTable, Instruction, InstructionCoder, TypesCoder,
    };
    pub use crate::config::{CodecConfig, HashingConfig, LimitsConfig};
    pub use crate::format::{AccountDisplay, AccountMeta, ArgDisplay, InstructionDisplay, InstructionFormatter};
    pub use crate::idl::{Idl, IdlInstruction, IdlType, Primitive, TypeRegistry};
    pub use crate::json::{instruction_to_json, value_from_json, value_to_json};
    pub use crate::value::{EnumPayload, EnumValue, Fields, PublicKey, Value};
    pub use crate::{CodecError, CodecResult};
}
