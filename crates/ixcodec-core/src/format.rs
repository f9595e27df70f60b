//! Human-readable rendering of decoded instructions.
//!
//! The formatter walks argument values alongside their IDL types, so the
//! rendering follows the same recursion as the layouts that produced them.
//! Account trees are flattened into display names like
//! `"Authority > Owner"` and zipped with the runtime account list.

use serde::{Deserialize, Serialize};

use crate::case::{same_ident, title_words, upper_camel_case};
use crate::coder::Instruction;
use crate::errors::{CodecError, CodecResult};
use crate::idl::{
    EnumFields, Idl, IdlAccount, IdlAccountItem, IdlField, IdlInstruction, IdlType, IdlTypeDefTy, TypeRegistry,
};
use crate::value::{EnumPayload, Fields, PublicKey, Value};

/// Rendering used for tuple enum variants.
pub const TUPLE_PLACEHOLDER: &str = "Tuple formatting not yet implemented";

/// Runtime account passed to an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountMeta {
    pub pubkey: PublicKey,
    #[serde(default)]
    pub is_signer: bool,
    #[serde(default)]
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn new(pubkey: PublicKey, is_signer: bool, is_writable: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionDisplay {
    pub args: Vec<ArgDisplay>,
    pub accounts: Vec<AccountDisplay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgDisplay {
    pub name: String,
    #[serde(rename = "type")]
    pub type_label: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDisplay {
    /// `None` for accounts beyond the declared list (remaining accounts).
    pub name: Option<String>,
    pub pubkey: PublicKey,
    pub is_signer: bool,
    pub is_writable: bool,
}

#[derive(Debug, Clone)]
pub struct InstructionFormatter {
    instructions: Vec<IdlInstruction>,
    registry: TypeRegistry,
}

impl InstructionFormatter {
    pub fn new(idl: &Idl) -> Self {
        Self {
            instructions: idl.instructions.clone(),
            registry: TypeRegistry::from_idl(idl),
        }
    }

    /// Render `ix` with its runtime accounts. Returns `None` when the
    /// instruction is not part of the IDL.
    pub fn format(&self, ix: &Instruction, accounts: &[AccountMeta]) -> CodecResult<Option<InstructionDisplay>> {
        let Some(def) = self.instructions.iter().find(|d| same_ident(&d.name, &ix.name)) else {
            return Ok(None);
        };

        let args = def
            .args
            .iter()
            .map(|arg| {
                let value = ix
                    .data
                    .get(&arg.name)
                    .ok_or_else(|| CodecError::MissingField(arg.name.clone()))?;
                Ok(ArgDisplay {
                    name: arg.name.clone(),
                    type_label: arg.ty.label(),
                    data: self.render(&arg.ty, value)?,
                })
            })
            .collect::<CodecResult<Vec<_>>>()?;

        let names = flatten_account_names(&def.accounts);
        let accounts = accounts
            .iter()
            .enumerate()
            .map(|(i, meta)| AccountDisplay {
                name: names.get(i).cloned(),
                pubkey: meta.pubkey,
                is_signer: meta.is_signer,
                is_writable: meta.is_writable,
            })
            .collect();

        Ok(Some(InstructionDisplay { args, accounts }))
    }

    /// Render a single value of type `ty`.
    pub fn render(&self, ty: &IdlType, value: &Value) -> CodecResult<String> {
        match (ty, value) {
            (IdlType::Primitive(p), v) if v.kind() == p.label() => v
                .scalar_text()
                .ok_or_else(|| CodecError::mismatch(p.label(), v.kind())),
            (IdlType::Vec(inner), Value::Vec(items)) | (IdlType::Array(inner, _), Value::Array(items)) => {
                let rendered = items
                    .iter()
                    .map(|v| self.render(inner, v))
                    .collect::<CodecResult<Vec<_>>>()?;
                Ok(format!("[{}]", rendered.join(", ")))
            }
            (IdlType::Option(_), Value::Option(None)) => Ok("null".to_string()),
            (IdlType::Option(inner), Value::Option(Some(v))) => self.render(inner, v),
            (IdlType::Defined(name), v) => self.render_defined(name, v),
            (ty, v) => Err(CodecError::mismatch(ty.label(), v.kind())),
        }
    }

    fn render_defined(&self, name: &str, value: &Value) -> CodecResult<String> {
        match (self.registry.require(name)?, value) {
            (IdlTypeDefTy::Struct { fields }, Value::Struct(values)) => self.render_fields(fields, values),
            (IdlTypeDefTy::Enum { variants }, Value::Enum(ev)) => {
                let variant = variants
                    .iter()
                    .find(|v| same_ident(&v.name, &ev.variant))
                    .ok_or_else(|| CodecError::mismatch(format!("variant of {name}"), ev.variant.clone()))?;
                let label = upper_camel_case(&variant.name);

                match (&variant.fields, &ev.payload) {
                    (Some(EnumFields::Tuple(_)), _) | (_, EnumPayload::Tuple(_)) => Ok(TUPLE_PLACEHOLDER.to_string()),
                    (Some(EnumFields::Named(defs)), EnumPayload::Named(values)) if !values.is_empty() => {
                        Ok(format!("{label} {}", self.render_fields(defs, values)?))
                    }
                    _ => Ok(label),
                }
            }
            (_, v) => Err(CodecError::mismatch(name, v.kind())),
        }
    }

    /// `{ a: 1, b: 2 }` in declared order, skipping fields the value lacks.
    fn render_fields(&self, defs: &[IdlField], values: &Fields) -> CodecResult<String> {
        let parts = defs
            .iter()
            .filter_map(|f| values.get(&f.name).map(|v| (f, v)))
            .map(|(f, v)| Ok(format!("{}: {}", f.name, self.render(&f.ty, v)?)))
            .collect::<CodecResult<Vec<_>>>()?;
        if parts.is_empty() {
            return Ok("{}".to_string());
        }
        Ok(format!("{{ {} }}", parts.join(", ")))
    }
}

/// A leaf of an account tree with its display path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatAccount<'a> {
    pub name: String,
    pub account: &'a IdlAccount,
}

/// Flatten an account tree depth-first, preserving declaration order.
pub fn flatten_accounts(items: &[IdlAccountItem]) -> Vec<FlatAccount<'_>> {
    fn walk<'a>(items: &'a [IdlAccountItem], prefix: Option<&str>, out: &mut Vec<FlatAccount<'a>>) {
        for item in items {
            match item {
                IdlAccountItem::Account(a) => out.push(FlatAccount {
                    name: join_segment(prefix, &a.name),
                    account: a,
                }),
                IdlAccountItem::Group(g) => walk(&g.accounts, Some(&join_segment(prefix, &g.name)), out),
            }
        }
    }

    let mut out = Vec::new();
    walk(items, None, &mut out);
    out
}

fn join_segment(prefix: Option<&str>, name: &str) -> String {
    let segment = title_words(name);
    match prefix {
        Some(p) => format!("{p} > {segment}"),
        None => segment,
    }
}

/// Display names of [`flatten_accounts`].
pub fn flatten_account_names(items: &[IdlAccountItem]) -> Vec<String> {
    flatten_accounts(items).into_iter().map(|a| a.name).collect()
}
