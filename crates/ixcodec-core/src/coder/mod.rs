//! Coders built from an IDL.
//!
//! [`BorshCoder`] bundles the instruction, account and named-type coders over
//! a single compiled [`TypeTable`]. Each coder can also be built on its own,
//! in which case it only compiles the types it can reach.

use std::sync::Arc;

use crate::config::{validate_config, CodecConfig};
use crate::errors::CodecResult;
use crate::idl::{Idl, TypeRegistry};
use crate::layout::{LayoutCompiler, TypeTable};

pub mod accounts;
pub mod discriminator;
pub mod instruction;
pub mod types;

pub use accounts::AccountsCoder;
pub use discriminator::DiscriminatorTable;
pub use instruction::{DataEncoding, Instruction, InstructionCoder};
pub use types::TypesCoder;

#[derive(Debug, Clone)]
pub struct BorshCoder {
    pub instruction: InstructionCoder,
    pub accounts: AccountsCoder,
    pub types: TypesCoder,
}

impl BorshCoder {
    pub fn new(idl: &Idl) -> CodecResult<Self> {
        Self::with_config(idl, CodecConfig::default())
    }

    /// Compile every type in the IDL once and share the table between coders.
    pub fn with_config(idl: &Idl, config: CodecConfig) -> CodecResult<Self> {
        validate_config(&config)?;
        let registry = TypeRegistry::from_idl(idl);
        let compiler = LayoutCompiler::new(&registry);

        let table: Arc<TypeTable> = Arc::new(compiler.build_full_table()?);
        let ix_layouts = InstructionCoder::compile_layouts(idl, &compiler)?;
        let acc_layouts = AccountsCoder::compile_layouts(idl, &compiler)?;

        Ok(Self {
            instruction: InstructionCoder::assemble(idl, ix_layouts, Arc::clone(&table), config.clone())?,
            accounts: AccountsCoder::assemble(idl, acc_layouts, Arc::clone(&table), config.clone())?,
            types: TypesCoder::from_table(table, config),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CodecError;
    use assert_matches::assert_matches;

    #[test]
    fn shares_one_table() {
        let idl = Idl::from_json_str(
            r#"{
                "instructions": [{"name": "poke", "accounts": [], "args": [{"name": "p", "type": {"defined": "P"}}]}],
                "accounts": [{"name": "Store", "type": {"kind": "struct", "fields": [{"name": "p", "type": {"defined": "P"}}]}}],
                "types": [{"name": "P", "type": {"kind": "struct", "fields": [{"name": "v", "type": "u16"}]}}]
            }"#,
        )
        .unwrap();
        let coder = BorshCoder::new(&idl).unwrap();
        assert!(coder.instruction.types().contains("P"));
        assert!(coder.instruction.types().contains("Store"));
        assert_eq!(coder.types.size("P").unwrap(), Some(2));
        assert_eq!(coder.accounts.size("Store").unwrap(), Some(10));
    }

    #[test]
    fn unused_broken_type_fails_full_build() {
        let idl = Idl::from_json_str(
            r#"{"types": [{"name": "Bad", "type": {"kind": "struct", "fields": [{"name": "x", "type": {"defined": "Gone"}}]}}]}"#,
        )
        .unwrap();
        assert_matches!(BorshCoder::new(&idl), Err(CodecError::UnresolvedType(_)));
        assert!(InstructionCoder::new(&idl).is_ok());
    }
}
