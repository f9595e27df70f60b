//! IDL data model.
//!
//! These are plain serde models of an Anchor-style interface description. The
//! model is treated as an immutable input document: coders read it once at
//! construction and never keep references into it.
//!
//! Only the parts of the document the codec needs are modelled; unknown keys
//! (events, errors, metadata, ...) are ignored on deserialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::case::same_ident;
use crate::errors::{CodecError, CodecResult};

pub mod types;

pub use types::{IdlType, Primitive};

/// A complete interface description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idl {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub instructions: Vec<IdlInstruction>,
    #[serde(default)]
    pub accounts: Vec<IdlAccountDef>,
    #[serde(default)]
    pub types: Vec<IdlTypeDef>,
}

impl Idl {
    pub fn from_json_str(s: &str) -> CodecResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_slice(bytes: &[u8]) -> CodecResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Find an instruction by name, ignoring case style.
    pub fn find_instruction(&self, name: &str) -> Option<&IdlInstruction> {
        self.instructions.iter().find(|ix| same_ident(&ix.name, name))
    }

    pub fn find_account(&self, name: &str) -> Option<&IdlAccountDef> {
        self.accounts.iter().find(|a| a.name == name)
    }
}

/// A callable instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdlInstruction {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    #[serde(default)]
    pub accounts: Vec<IdlAccountItem>,
    #[serde(default)]
    pub args: Vec<IdlField>,
    /// Explicit discriminator bytes; hash-derived when absent.
    #[serde(default, alias = "discriminator", skip_serializing_if = "Option::is_none")]
    pub discriminant: Option<Vec<u8>>,
}

/// A named, typed slot (instruction argument or struct field).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: IdlType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
}

impl IdlField {
    pub fn new(name: impl Into<String>, ty: impl Into<IdlType>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            docs: Vec::new(),
        }
    }
}

/// A named type definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlTypeDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    #[serde(rename = "type")]
    pub ty: IdlTypeDefTy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IdlTypeDefTy {
    Struct {
        #[serde(default)]
        fields: Vec<IdlField>,
    },
    Enum {
        variants: Vec<IdlEnumVariant>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlEnumVariant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<EnumFields>,
}

impl IdlEnumVariant {
    pub fn unit(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: None,
        }
    }

    pub fn named(name: impl Into<String>, fields: Vec<IdlField>) -> Self {
        Self {
            name: name.into(),
            fields: Some(EnumFields::Named(fields)),
        }
    }

    pub fn tuple(name: impl Into<String>, types: Vec<IdlType>) -> Self {
        Self {
            name: name.into(),
            fields: Some(EnumFields::Tuple(types)),
        }
    }

    /// True when the variant carries no payload bytes.
    pub fn is_unit(&self) -> bool {
        match &self.fields {
            None => true,
            Some(EnumFields::Named(f)) => f.is_empty(),
            Some(EnumFields::Tuple(t)) => t.is_empty(),
        }
    }
}

/// Enum variant payload shape. Named fields are tried first so that an empty
/// list parses as an (empty) named group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumFields {
    Named(Vec<IdlField>),
    Tuple(Vec<IdlType>),
}

/// An account data type. Legacy IDLs embed the type; newer ones reference a
/// same-named entry in `types` and may carry explicit discriminator bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlAccountDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Vec<u8>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<IdlTypeDefTy>,
}

/// Node of an instruction's account tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdlAccountItem {
    Group(IdlAccounts),
    Account(IdlAccount),
}

/// A single account slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdlAccount {
    pub name: String,
    #[serde(default, alias = "writable")]
    pub is_mut: bool,
    #[serde(default, alias = "signer")]
    pub is_signer: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
}

impl IdlAccount {
    pub fn new(name: impl Into<String>, is_mut: bool, is_signer: bool) -> Self {
        Self {
            name: name.into(),
            is_mut,
            is_signer,
            optional: false,
            docs: Vec::new(),
        }
    }
}

/// A named group of account slots (a nested accounts struct).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlAccounts {
    pub name: String,
    pub accounts: Vec<IdlAccountItem>,
}

/// Name-indexed view over the defined types of an IDL.
///
/// Holds `types` plus any account definitions with an embedded type. An
/// account never shadows a same-named entry in `types`.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    defs: BTreeMap<String, IdlTypeDefTy>,
}

impl TypeRegistry {
    pub fn from_idl(idl: &Idl) -> Self {
        let mut defs = BTreeMap::new();
        for t in &idl.types {
            defs.insert(t.name.clone(), t.ty.clone());
        }
        for a in &idl.accounts {
            if let Some(ty) = &a.ty {
                defs.entry(a.name.clone()).or_insert_with(|| ty.clone());
            }
        }
        Self { defs }
    }

    pub fn get(&self, name: &str) -> Option<&IdlTypeDefTy> {
        self.defs.get(name)
    }

    /// Look up a definition, failing with `UnresolvedType`.
    pub fn require(&self, name: &str) -> CodecResult<&IdlTypeDefTy> {
        self.get(name)
            .ok_or_else(|| CodecError::UnresolvedType(name.to_string()))
    }

    /// Defined type names in deterministic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
