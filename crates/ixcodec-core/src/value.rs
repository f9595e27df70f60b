//! Decoded value model.
//!
//! `Value` mirrors the shape of [`IdlType`](crate::idl::IdlType): one case per
//! primitive plus the compound cases. Struct-like values use `BTreeMap` so
//! equality ignores key insertion order.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::CodecError;

/// Named fields of a struct value or struct enum variant.
pub type Fields = BTreeMap<String, Value>;

/// A 32-byte public key, displayed in base58.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize,
)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    pub const LEN: usize = 32;

    pub const fn new_from_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({self})")
    }
}

impl FromStr for PublicKey {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s.trim())
            .into_vec()
            .map_err(|e| CodecError::InvalidEncoding {
                encoding: "base58",
                message: e.to_string(),
            })?;
        let arr: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| CodecError::InvalidEncoding {
            encoding: "base58",
            message: format!("public key must be 32 bytes, got {}", b.len()),
        })?;
        Ok(Self(arr))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A decoded (or to-be-encoded) value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    F32(f32),
    U64(u64),
    I64(i64),
    F64(f64),
    U128(u128),
    I128(i128),
    Bytes(Vec<u8>),
    String(String),
    PublicKey(PublicKey),
    Vec(Vec<Value>),
    Option(Option<Box<Value>>),
    Array(Vec<Value>),
    Struct(Fields),
    Enum(EnumValue),
}

/// A value of a defined enum type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub variant: String,
    pub payload: EnumPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnumPayload {
    Unit,
    Named(Fields),
    Tuple(Vec<Value>),
}

impl Value {
    /// Short name of the value's shape, used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::U8(_) => "u8",
            Value::I8(_) => "i8",
            Value::U16(_) => "u16",
            Value::I16(_) => "i16",
            Value::U32(_) => "u32",
            Value::I32(_) => "i32",
            Value::F32(_) => "f32",
            Value::U64(_) => "u64",
            Value::I64(_) => "i64",
            Value::F64(_) => "f64",
            Value::U128(_) => "u128",
            Value::I128(_) => "i128",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::PublicKey(_) => "publicKey",
            Value::Vec(_) => "vec",
            Value::Option(_) => "option",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
            Value::Enum(_) => "enum",
        }
    }

    pub fn some(inner: Value) -> Self {
        Value::Option(Some(Box::new(inner)))
    }

    pub fn none() -> Self {
        Value::Option(None)
    }

    pub fn unit_variant(name: impl Into<String>) -> Self {
        Value::Enum(EnumValue {
            variant: name.into(),
            payload: EnumPayload::Unit,
        })
    }

    pub fn named_variant(name: impl Into<String>, fields: Fields) -> Self {
        Value::Enum(EnumValue {
            variant: name.into(),
            payload: EnumPayload::Named(fields),
        })
    }

    pub fn tuple_variant(name: impl Into<String>, values: Vec<Value>) -> Self {
        Value::Enum(EnumValue {
            variant: name.into(),
            payload: EnumPayload::Tuple(values),
        })
    }

    /// Build a struct value from `(name, value)` pairs.
    pub fn structure<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Textual form of a scalar value; `None` for compound values.
    pub fn scalar_text(&self) -> Option<String> {
        let s = match self {
            Value::Bool(v) => v.to_string(),
            Value::U8(v) => v.to_string(),
            Value::I8(v) => v.to_string(),
            Value::U16(v) => v.to_string(),
            Value::I16(v) => v.to_string(),
            Value::U32(v) => v.to_string(),
            Value::I32(v) => v.to_string(),
            Value::F32(v) => v.to_string(),
            Value::U64(v) => v.to_string(),
            Value::I64(v) => v.to_string(),
            Value::F64(v) => v.to_string(),
            Value::U128(v) => v.to_string(),
            Value::I128(v) => v.to_string(),
            Value::String(v) => v.clone(),
            Value::PublicKey(v) => v.to_string(),
            Value::Bytes(v) => {
                let items: Vec<String> = v.iter().map(u8::to_string).collect();
                format!("[{}]", items.join(", "))
            }
            _ => return None,
        };
        Some(s)
    }
}

macro_rules! impl_from_scalar {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_scalar!(
    bool => Bool,
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    f32 => F32,
    u64 => U64,
    i64 => I64,
    f64 => F64,
    u128 => U128,
    i128 => I128,
    String => String,
    PublicKey => PublicKey,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}
