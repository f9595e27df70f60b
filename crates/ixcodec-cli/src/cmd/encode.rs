use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use ixcodec_core::coder::InstructionCoder;
use ixcodec_core::idl::TypeRegistry;
use ixcodec_core::json::fields_from_json;
use serde::Serialize;

use crate::io::input;
use crate::output;

#[derive(Debug, Serialize)]
pub struct EncodeOut {
    pub instruction: String,
    pub discriminator: String,
    pub len: usize,
    pub hex: String,
    pub base58: String,
}

pub fn run(idl_path: &Path, name: &str, args: &str) -> Result<()> {
    let idl = input::read_idl(idl_path)?;
    let def = idl
        .find_instruction(name)
        .ok_or_else(|| anyhow!("unknown instruction: {name}"))?;
    let coder = InstructionCoder::new(&idl)?;

    let registry = TypeRegistry::from_idl(&idl);
    let args_json = input::read_json_arg(args)?;
    let fields = fields_from_json(&def.args, &args_json, &registry)
        .with_context(|| format!("invalid arguments for {}", def.name))?;

    let data = coder.encode(name, &fields)?;
    let disc_len = coder.discriminators().len();

    let out = EncodeOut {
        instruction: def.name.clone(),
        discriminator: hex::encode(&data[..disc_len]),
        len: data.len(),
        hex: hex::encode(&data),
        base58: bs58::encode(&data).into_string(),
    };
    output::emit(&out, |w| {
        output::field(w, "instruction", &out.instruction)?;
        output::field(w, "discriminator", &out.discriminator)?;
        output::field(w, "length", &out.len.to_string())?;
        output::field(w, "hex", &out.hex)?;
        output::field(w, "base58", &out.base58)?;
        w.flush()
    })
}
