use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use ixcodec_core::format::AccountMeta;
use ixcodec_core::idl::Idl;
use tracing::debug;

pub fn read_idl<P: AsRef<Path>>(path: P) -> Result<Idl> {
    let path = path.as_ref();
    let raw = fs::read(path).with_context(|| format!("failed to read IDL {}", path.display()))?;
    let idl = Idl::from_json_slice(&raw).with_context(|| format!("invalid IDL {}", path.display()))?;
    debug!(
        path = %path.display(),
        instructions = idl.instructions.len(),
        types = idl.types.len(),
        "loaded IDL"
    );
    Ok(idl)
}

pub fn read_json_file<P: AsRef<Path>>(path: P) -> Result<serde_json::Value> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let v: serde_json::Value = serde_json::from_str(&raw).map_err(|e| anyhow!("invalid json: {e}"))?;
    Ok(v)
}

/// Inline JSON, or `@path` to read it from a file.
pub fn read_json_arg(arg: &str) -> Result<serde_json::Value> {
    match arg.strip_prefix('@') {
        Some(path) => read_json_file(path),
        None => serde_json::from_str(arg).map_err(|e| anyhow!("invalid json: {e}")),
    }
}

pub fn read_accounts<P: AsRef<Path>>(path: P) -> Result<Vec<AccountMeta>> {
    let v = read_json_file(path)?;
    serde_json::from_value(v).map_err(|e| anyhow!("invalid accounts json: {e}"))
}
