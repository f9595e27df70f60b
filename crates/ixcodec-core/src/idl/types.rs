//! Type references as they appear in IDL documents.
//!
//! JSON forms accepted:
//! - `"u64"`, `"string"`, `"publicKey"` (alias `"pubkey"`), ...
//! - `{"vec": T}`, `{"option": T}`, `{"array": [T, n]}`
//! - `{"defined": "Name"}` or `{"defined": {"name": "Name"}}`

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar and opaque leaf types encoded directly by borsh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    U64,
    I64,
    F64,
    U128,
    I128,
    Bytes,
    String,
    PublicKey,
}

impl Primitive {
    pub fn parse(s: &str) -> Option<Self> {
        let p = match s {
            "bool" => Self::Bool,
            "u8" => Self::U8,
            "i8" => Self::I8,
            "u16" => Self::U16,
            "i16" => Self::I16,
            "u32" => Self::U32,
            "i32" => Self::I32,
            "f32" => Self::F32,
            "u64" => Self::U64,
            "i64" => Self::I64,
            "f64" => Self::F64,
            "u128" => Self::U128,
            "i128" => Self::I128,
            "bytes" => Self::Bytes,
            "string" => Self::String,
            "publicKey" | "pubkey" => Self::PublicKey,
            _ => return None,
        };
        Some(p)
    }

    /// IDL spelling of the type, also used as its display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::F32 => "f32",
            Self::U64 => "u64",
            Self::I64 => "i64",
            Self::F64 => "f64",
            Self::U128 => "u128",
            Self::I128 => "i128",
            Self::Bytes => "bytes",
            Self::String => "string",
            Self::PublicKey => "publicKey",
        }
    }

    /// Encoded width in bytes, `None` for length-prefixed kinds.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            Self::Bool | Self::U8 | Self::I8 => Some(1),
            Self::U16 | Self::I16 => Some(2),
            Self::U32 | Self::I32 | Self::F32 => Some(4),
            Self::U64 | Self::I64 | Self::F64 => Some(8),
            Self::U128 | Self::I128 => Some(16),
            Self::PublicKey => Some(32),
            Self::Bytes | Self::String => None,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An abstract type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "IdlTypeRepr", into = "IdlTypeRepr")]
pub enum IdlType {
    Primitive(Primitive),
    Vec(Box<IdlType>),
    Option(Box<IdlType>),
    Array(Box<IdlType>, usize),
    Defined(String),
}

impl IdlType {
    pub fn vec(inner: IdlType) -> Self {
        Self::Vec(Box::new(inner))
    }

    pub fn option(inner: IdlType) -> Self {
        Self::Option(Box::new(inner))
    }

    pub fn array(inner: IdlType, len: usize) -> Self {
        Self::Array(Box::new(inner), len)
    }

    pub fn defined(name: impl Into<String>) -> Self {
        Self::Defined(name.into())
    }

    /// Display label: `u64`, `Vec<T>`, `Option<T>`, `Array<T; n>`, or the defined name.
    pub fn label(&self) -> String {
        match self {
            Self::Primitive(p) => p.label().to_string(),
            Self::Vec(inner) => format!("Vec<{}>", inner.label()),
            Self::Option(inner) => format!("Option<{}>", inner.label()),
            Self::Array(inner, len) => format!("Array<{}; {}>", inner.label(), len),
            Self::Defined(name) => name.clone(),
        }
    }
}

impl From<Primitive> for IdlType {
    fn from(p: Primitive) -> Self {
        Self::Primitive(p)
    }
}

impl fmt::Display for IdlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum IdlTypeRepr {
    Named(String),
    Compound(CompoundRepr),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum CompoundRepr {
    Vec(IdlType),
    Option(IdlType),
    Array(IdlType, usize),
    Defined(DefinedRepr),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DefinedRepr {
    Name(String),
    Object { name: String },
}

impl TryFrom<IdlTypeRepr> for IdlType {
    type Error = String;

    fn try_from(repr: IdlTypeRepr) -> Result<Self, Self::Error> {
        Ok(match repr {
            IdlTypeRepr::Named(s) => {
                IdlType::Primitive(Primitive::parse(&s).ok_or_else(|| format!("unknown primitive type: {s}"))?)
            }
            IdlTypeRepr::Compound(CompoundRepr::Vec(t)) => IdlType::vec(t),
            IdlTypeRepr::Compound(CompoundRepr::Option(t)) => IdlType::option(t),
            IdlTypeRepr::Compound(CompoundRepr::Array(t, n)) => IdlType::array(t, n),
            IdlTypeRepr::Compound(CompoundRepr::Defined(DefinedRepr::Name(name)))
            | IdlTypeRepr::Compound(CompoundRepr::Defined(DefinedRepr::Object { name })) => IdlType::Defined(name),
        })
    }
}

impl From<IdlType> for IdlTypeRepr {
    fn from(ty: IdlType) -> Self {
        match ty {
            IdlType::Primitive(p) => IdlTypeRepr::Named(p.label().to_string()),
            IdlType::Vec(t) => IdlTypeRepr::Compound(CompoundRepr::Vec(*t)),
            IdlType::Option(t) => IdlTypeRepr::Compound(CompoundRepr::Option(*t)),
            IdlType::Array(t, n) => IdlTypeRepr::Compound(CompoundRepr::Array(*t, n)),
            IdlType::Defined(name) => IdlTypeRepr::Compound(CompoundRepr::Defined(DefinedRepr::Name(name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> IdlType {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn parses_all_json_forms() {
        assert_eq!(parse(r#""u64""#), IdlType::Primitive(Primitive::U64));
        assert_eq!(parse(r#""pubkey""#), IdlType::Primitive(Primitive::PublicKey));
        assert_eq!(parse(r#"{"vec":"u8"}"#), IdlType::vec(Primitive::U8.into()));
        assert_eq!(parse(r#"{"option":{"defined":"State"}}"#), IdlType::option(IdlType::defined("State")));
        assert_eq!(parse(r#"{"array":["u16",4]}"#), IdlType::array(Primitive::U16.into(), 4));
        assert_eq!(parse(r#"{"defined":{"name":"State"}}"#), IdlType::defined("State"));
    }

    #[test]
    fn unknown_primitive_rejected() {
        assert!(serde_json::from_str::<IdlType>(r#""u256""#).is_err());
    }

    #[test]
    fn labels() {
        let ty = parse(r#"{"vec":{"option":{"array":[{"defined":"Pt"},3]}}}"#);
        assert_eq!(ty.label(), "Vec<Option<Array<Pt; 3>>>");
    }

    #[test]
    fn serializes_back_to_idl_json() {
        let ty = IdlType::vec(Primitive::PublicKey.into());
        assert_eq!(serde_json::to_string(&ty).unwrap(), r#"{"vec":"publicKey"}"#);
    }
}
