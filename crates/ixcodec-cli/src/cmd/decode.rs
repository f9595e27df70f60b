use std::path::Path;

use anyhow::Result;
use ixcodec_core::coder::{DataEncoding, InstructionCoder};
use ixcodec_core::json::value_to_json;
use serde::Serialize;

use crate::io::input;
use crate::output;

#[derive(Debug, Serialize)]
pub struct DecodeOut {
    pub recognized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

pub fn run(idl_path: &Path, data: &str, encoding: DataEncoding) -> Result<()> {
    let idl = input::read_idl(idl_path)?;
    let coder = InstructionCoder::new(&idl)?;

    let Some(ix) = coder.decode_str(data, encoding)? else {
        let out = DecodeOut {
            recognized: false,
            name: None,
            data: None,
        };
        return output::emit(&out, |w| output::heading(w, "instruction not recognized"));
    };

    let fields: serde_json::Map<String, serde_json::Value> =
        ix.data.iter().map(|(k, v)| (k.clone(), value_to_json(v))).collect();

    // Argument order for display comes from the IDL, not the map.
    let order: Vec<String> = idl
        .find_instruction(&ix.name)
        .map(|d| d.args.iter().map(|a| a.name.clone()).collect())
        .unwrap_or_default();

    let out = DecodeOut {
        recognized: true,
        name: Some(ix.name.clone()),
        data: Some(serde_json::Value::Object(fields.clone())),
    };
    output::emit(&out, |w| {
        output::field(w, "instruction", &ix.name)?;
        for name in &order {
            if let Some(v) = fields.get(name) {
                output::field(w, &format!("  {name}"), &v.to_string())?;
            }
        }
        Ok(())
    })
}
