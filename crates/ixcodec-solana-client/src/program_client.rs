//! IDL-driven client for one on-chain program.
//!
//! This client can:
//! - encode instruction data and assemble `solana_program` instructions
//! - derive account metas (signer/writable flags) from the IDL account tree
//! - recognise, decode and format instructions addressed to its program
//!
//! Instructions addressed to other programs are reported as `None`, the same
//! way unknown discriminators are.

use anyhow::{Context, Result};
use ixcodec_core::coder::{BorshCoder, Instruction as DecodedInstruction};
use ixcodec_core::config::CodecConfig;
use ixcodec_core::format::{flatten_accounts, InstructionDisplay, InstructionFormatter};
use ixcodec_core::idl::{Idl, IdlInstruction, TypeRegistry};
use ixcodec_core::json::fields_from_json;
use ixcodec_core::value::Fields;
use solana_program::instruction::{AccountMeta, Instruction};
use solana_program::pubkey::Pubkey;
use thiserror::Error;
use tracing::trace;

use crate::convert::to_codec_meta;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("instruction {0} is not part of the IDL")]
    UnknownInstruction(String),

    #[error("instruction {instruction} declares {expected} accounts, got {actual}")]
    NotEnoughAccounts {
        instruction: String,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Clone)]
pub struct IdlProgramClient {
    pub program_id: Pubkey,
    idl: Idl,
    registry: TypeRegistry,
    coder: BorshCoder,
    formatter: InstructionFormatter,
}

impl IdlProgramClient {
    pub fn new(program_id: Pubkey, idl: Idl) -> Result<Self> {
        Self::with_config(program_id, idl, CodecConfig::default())
    }

    pub fn with_config(program_id: Pubkey, idl: Idl, config: CodecConfig) -> Result<Self> {
        let coder = BorshCoder::with_config(&idl, config)
            .with_context(|| format!("failed to build codec for IDL {:?}", idl.name))?;
        Ok(Self {
            program_id,
            registry: TypeRegistry::from_idl(&idl),
            formatter: InstructionFormatter::new(&idl),
            coder,
            idl,
        })
    }

    /// Parse an IDL JSON document and build a client for it.
    pub fn from_json(program_id: Pubkey, idl_json: &str) -> Result<Self> {
        let idl = Idl::from_json_str(idl_json).context("invalid IDL json")?;
        Self::new(program_id, idl)
    }

    pub fn idl(&self) -> &Idl {
        &self.idl
    }

    pub fn coder(&self) -> &BorshCoder {
        &self.coder
    }

    fn definition(&self, name: &str) -> Result<&IdlInstruction> {
        Ok(self
            .idl
            .find_instruction(name)
            .ok_or_else(|| ClientError::UnknownInstruction(name.to_string()))?)
    }

    /// Account metas for `name`, taking keys in flattened declaration order.
    /// Keys beyond the declared accounts are appended read-only.
    pub fn account_metas(&self, name: &str, keys: &[Pubkey]) -> Result<Vec<AccountMeta>> {
        let def = self.definition(name)?;
        let slots = flatten_accounts(&def.accounts);
        if keys.len() < slots.len() {
            return Err(ClientError::NotEnoughAccounts {
                instruction: def.name.clone(),
                expected: slots.len(),
                actual: keys.len(),
            }
            .into());
        }

        let declared = slots.iter().zip(keys).map(|(slot, key)| AccountMeta {
            pubkey: *key,
            is_signer: slot.account.is_signer,
            is_writable: slot.account.is_mut,
        });
        let remaining = keys[slots.len()..]
            .iter()
            .map(|key| AccountMeta::new_readonly(*key, false));
        Ok(declared.chain(remaining).collect())
    }

    /// Build an instruction from decoded argument values.
    pub fn build_instruction(&self, name: &str, args: &Fields, accounts: Vec<AccountMeta>) -> Result<Instruction> {
        let data = self
            .coder
            .instruction
            .encode(name, args)
            .with_context(|| format!("failed to encode instruction {name}"))?;
        Ok(Instruction {
            program_id: self.program_id,
            accounts,
            data,
        })
    }

    /// Build an instruction from JSON arguments.
    pub fn build_instruction_json(
        &self,
        name: &str,
        args: &serde_json::Value,
        accounts: Vec<AccountMeta>,
    ) -> Result<Instruction> {
        let def = self.definition(name)?;
        let fields = fields_from_json(&def.args, args, &self.registry)
            .with_context(|| format!("invalid arguments for {name}"))?;
        self.build_instruction(name, &fields, accounts)
    }

    /// Decode an instruction addressed to this program.
    pub fn decode_instruction(&self, ix: &Instruction) -> Result<Option<DecodedInstruction>> {
        if ix.program_id != self.program_id {
            trace!(program_id = %ix.program_id, "instruction addressed to another program");
            return Ok(None);
        }
        Ok(self.coder.instruction.decode(&ix.data)?)
    }

    /// Decode and render an instruction addressed to this program.
    pub fn format_instruction(&self, ix: &Instruction) -> Result<Option<InstructionDisplay>> {
        let Some(decoded) = self.decode_instruction(ix)? else {
            return Ok(None);
        };
        let metas: Vec<_> = ix.accounts.iter().map(to_codec_meta).collect();
        Ok(self.formatter.format(&decoded, &metas)?)
    }
}
