use std::io::Write;
use std::path::Path;

use anyhow::Result;
use ixcodec_core::coder::{DataEncoding, InstructionCoder};
use ixcodec_core::format::{InstructionDisplay, InstructionFormatter};
use serde::Serialize;
use tracing::debug;

use crate::io::input;
use crate::output;

#[derive(Debug, Serialize)]
pub struct FormatOut {
    pub name: String,
    #[serde(flatten)]
    pub display: InstructionDisplay,
}

pub fn run(idl_path: &Path, data: &str, encoding: DataEncoding, accounts: Option<&Path>) -> Result<()> {
    let idl = input::read_idl(idl_path)?;
    let coder = InstructionCoder::new(&idl)?;
    let formatter = InstructionFormatter::new(&idl);

    let metas = match accounts {
        Some(path) => input::read_accounts(path)?,
        None => Vec::new(),
    };
    debug!(accounts = metas.len(), "formatting instruction");

    let decoded = coder.decode_str(data, encoding)?;
    let shown = match &decoded {
        Some(ix) => formatter.format(ix, &metas)?,
        None => None,
    };
    let (Some(ix), Some(display)) = (decoded, shown) else {
        return output::emit(&serde_json::Value::Null, |w| output::heading(w, "instruction not recognized"));
    };

    let out = FormatOut {
        name: ix.name,
        display,
    };
    output::emit(&out, |w| {
        output::heading(w, &out.name)?;
        if !out.display.args.is_empty() {
            output::heading(w, "Arguments")?;
        }
        for arg in &out.display.args {
            output::field(w, &format!("  {} ({})", arg.name, arg.type_label), &arg.data)?;
        }
        if !out.display.accounts.is_empty() {
            output::heading(w, "Accounts")?;
        }
        for acc in &out.display.accounts {
            let mut flags = Vec::new();
            if acc.is_signer {
                flags.push("signer");
            }
            if acc.is_writable {
                flags.push("writable");
            }
            let name = acc.name.as_deref().unwrap_or("(remaining)");
            write!(w, "  {name}: {}", acc.pubkey)?;
            if !flags.is_empty() {
                output::dim(w, &format!(" [{}]", flags.join(", ")))?;
            }
            writeln!(w)?;
        }
        Ok(())
    })
}
