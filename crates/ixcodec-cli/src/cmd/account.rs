use std::path::Path;

use anyhow::{anyhow, Result};
use ixcodec_core::coder::{AccountsCoder, DataEncoding};
use ixcodec_core::json::value_to_json;
use serde::Serialize;

use crate::io::input;
use crate::output;

#[derive(Debug, Serialize)]
pub struct AccountOut {
    pub name: String,
    pub data: serde_json::Value,
}

pub fn run(idl_path: &Path, data: &str, encoding: DataEncoding, name: Option<&str>) -> Result<()> {
    let idl = input::read_idl(idl_path)?;
    let coder = AccountsCoder::new(&idl)?;
    let bytes = encoding.to_bytes(data.as_bytes())?;

    let (name, value) = match name {
        Some(name) => (name.to_string(), coder.decode(name, &bytes)?),
        None => coder
            .decode_any(&bytes)?
            .ok_or_else(|| anyhow!("account data matches no account type"))?,
    };

    let out = AccountOut {
        name,
        data: value_to_json(&value),
    };
    output::emit(&out, |w| {
        output::heading(w, &out.name)?;
        match &out.data {
            serde_json::Value::Object(fields) => {
                for (k, v) in fields {
                    output::field(w, &format!("  {k}"), &v.to_string())?;
                }
            }
            other => output::field(w, "  value", &other.to_string())?,
        }
        Ok(())
    })
}
