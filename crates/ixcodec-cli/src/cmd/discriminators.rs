use std::path::Path;

use anyhow::Result;
use ixcodec_core::coder::InstructionCoder;
use serde::Serialize;

use crate::io::input;
use crate::output;

#[derive(Debug, Serialize)]
pub struct DiscriminatorOut {
    pub name: String,
    pub hex: String,
    pub base58: String,
}

#[derive(Debug, Serialize)]
pub struct DiscriminatorsOut {
    pub len: usize,
    pub instructions: Vec<DiscriminatorOut>,
}

pub fn run(idl_path: &Path) -> Result<()> {
    let idl = input::read_idl(idl_path)?;
    let coder = InstructionCoder::new(&idl)?;

    // IDL declaration order.
    let instructions = idl
        .instructions
        .iter()
        .filter_map(|ix| {
            coder.discriminator(&ix.name).map(|d| DiscriminatorOut {
                name: ix.name.clone(),
                hex: hex::encode(d),
                base58: bs58::encode(d).into_string(),
            })
        })
        .collect();

    let out = DiscriminatorsOut {
        len: coder.discriminators().len(),
        instructions,
    };
    output::emit(&out, |w| {
        for d in &out.instructions {
            output::field(w, &d.name, &d.hex)?;
        }
        Ok(())
    })
}
