//! Discriminator table.
//!
//! Maps each instruction to the byte prefix that identifies it on the wire,
//! and maps prefixes back to instruction names. Built once; every entry has
//! the same length and no two instructions share a prefix.

use std::collections::{BTreeMap, HashMap};

use crate::case::camel_case;
use crate::config::HashingConfig;
use crate::errors::{CodecError, CodecResult};
use crate::hash::{discriminator_key, sighash};
use crate::idl::IdlInstruction;

#[derive(Debug, Clone)]
pub struct DiscriminatorTable {
    len: usize,
    by_name: BTreeMap<String, Vec<u8>>,
    by_key: HashMap<String, String>,
}

impl DiscriminatorTable {
    /// Build the table. Names are stored in canonical camelCase form.
    pub fn build(instructions: &[IdlInstruction], cfg: &HashingConfig) -> CodecResult<Self> {
        let mut len: Option<usize> = None;
        let mut by_name = BTreeMap::new();
        let mut by_key: HashMap<String, String> = HashMap::new();

        for ix in instructions {
            let name = camel_case(&ix.name);
            if by_name.contains_key(&name) {
                return Err(CodecError::invalid_config(format!("duplicate instruction name: {name}")));
            }
            let bytes = match &ix.discriminant {
                Some(explicit) => explicit.clone(),
                None => sighash(cfg, &ix.name),
            };
            if bytes.is_empty() {
                return Err(CodecError::invalid_config(format!(
                    "instruction {name} has an empty discriminator"
                )));
            }

            match len {
                None => len = Some(bytes.len()),
                Some(expected) if expected != bytes.len() => {
                    return Err(CodecError::DiscriminatorLength {
                        name: ix.name.clone(),
                        expected,
                        actual: bytes.len(),
                    });
                }
                Some(_) => {}
            }

            let key = discriminator_key(&bytes);
            if let Some(first) = by_key.get(&key) {
                return Err(CodecError::DuplicateDiscriminator {
                    discriminator: hex::encode(&bytes),
                    first: first.clone(),
                    second: name,
                });
            }
            by_key.insert(key, name.clone());
            by_name.insert(name, bytes);
        }

        Ok(Self {
            len: len.unwrap_or(cfg.discriminator_len),
            by_name,
            by_key,
        })
    }

    /// Shared discriminator length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of instructions in the table.
    pub fn count(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Discriminator bytes for a canonical instruction name.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.by_name.get(name).map(Vec::as_slice)
    }

    /// Instruction name owning `prefix`.
    pub fn lookup(&self, prefix: &[u8]) -> Option<&str> {
        self.by_key.get(&discriminator_key(prefix)).map(String::as_str)
    }

    /// `(name, discriminator)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.by_name.iter().map(|(n, d)| (n.as_str(), d.as_slice()))
    }
}
