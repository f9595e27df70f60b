//! Type-directed conversion between JSON and [`Value`].
//!
//! JSON alone cannot say whether `5` is a `u8` or an `i64`, so input is read
//! against the IDL type it is meant to fill. Accepted forms:
//! - integers as JSON numbers or decimal strings (needed beyond 2^53)
//! - public keys as base58 strings
//! - `bytes` as an array of numbers or a `0x`-prefixed hex string
//! - options as `null` or the inner value
//! - enums as `"Variant"` or `{"Variant": payload}`, the payload being an
//!   object for named variants and an array for tuple variants
//!
//! Output writes 64 and 128-bit integers as strings so no JSON reader loses
//! precision.

use serde_json::{json, Map, Number, Value as Json};

use crate::case::same_ident;
use crate::coder::Instruction;
use crate::errors::{CodecError, CodecResult};
use crate::idl::{EnumFields, IdlEnumVariant, IdlField, IdlType, IdlTypeDefTy, Primitive, TypeRegistry};
use crate::value::{EnumPayload, EnumValue, Fields, Value};

fn json_kind(j: &Json) -> &'static str {
    match j {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn unsigned(p: Primitive, j: &Json) -> CodecResult<u128> {
    let parsed = match j {
        Json::Number(n) => n.as_u64().map(u128::from),
        Json::String(s) => s.trim().parse::<u128>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| CodecError::mismatch(p.label(), json_kind(j)))
}

fn signed(p: Primitive, j: &Json) -> CodecResult<i128> {
    let parsed = match j {
        Json::Number(n) => n.as_i64().map(i128::from),
        Json::String(s) => s.trim().parse::<i128>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| CodecError::mismatch(p.label(), json_kind(j)))
}

fn float(p: Primitive, j: &Json) -> CodecResult<f64> {
    let parsed = match j {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| CodecError::mismatch(p.label(), json_kind(j)))
}

fn out_of_range(p: Primitive) -> impl FnOnce(std::num::TryFromIntError) -> CodecError {
    move |_| CodecError::mismatch(p.label(), "integer out of range")
}

fn primitive_from_json(p: Primitive, j: &Json) -> CodecResult<Value> {
    let range = out_of_range(p);
    Ok(match p {
        Primitive::Bool => Value::Bool(j.as_bool().ok_or_else(|| CodecError::mismatch("bool", json_kind(j)))?),
        Primitive::U8 => Value::U8(unsigned(p, j)?.try_into().map_err(range)?),
        Primitive::U16 => Value::U16(unsigned(p, j)?.try_into().map_err(range)?),
        Primitive::U32 => Value::U32(unsigned(p, j)?.try_into().map_err(range)?),
        Primitive::U64 => Value::U64(unsigned(p, j)?.try_into().map_err(range)?),
        Primitive::U128 => Value::U128(unsigned(p, j)?),
        Primitive::I8 => Value::I8(signed(p, j)?.try_into().map_err(range)?),
        Primitive::I16 => Value::I16(signed(p, j)?.try_into().map_err(range)?),
        Primitive::I32 => Value::I32(signed(p, j)?.try_into().map_err(range)?),
        Primitive::I64 => Value::I64(signed(p, j)?.try_into().map_err(range)?),
        Primitive::I128 => Value::I128(signed(p, j)?),
        Primitive::F32 => Value::F32(float(p, j)? as f32),
        Primitive::F64 => Value::F64(float(p, j)?),
        Primitive::String => match j {
            Json::String(s) => Value::String(s.clone()),
            other => return Err(CodecError::mismatch("string", json_kind(other))),
        },
        Primitive::PublicKey => match j {
            Json::String(s) => Value::PublicKey(s.parse()?),
            other => return Err(CodecError::mismatch("publicKey", json_kind(other))),
        },
        Primitive::Bytes => Value::Bytes(bytes_from_json(j)?),
    })
}

fn bytes_from_json(j: &Json) -> CodecResult<Vec<u8>> {
    match j {
        Json::String(s) => {
            let hex_text = s.trim().strip_prefix("0x").ok_or_else(|| {
                CodecError::mismatch("bytes as number array or 0x-prefixed hex", "string")
            })?;
            hex::decode(hex_text).map_err(|e| CodecError::InvalidEncoding {
                encoding: "hex",
                message: e.to_string(),
            })
        }
        Json::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| CodecError::mismatch("byte", json_kind(item)))
            })
            .collect(),
        other => Err(CodecError::mismatch("bytes", json_kind(other))),
    }
}

/// Read a JSON value as an instance of `ty`.
pub fn value_from_json(ty: &IdlType, j: &Json, registry: &TypeRegistry) -> CodecResult<Value> {
    match ty {
        IdlType::Primitive(p) => primitive_from_json(*p, j),
        IdlType::Vec(inner) => match j {
            Json::Array(items) => Ok(Value::Vec(
                items
                    .iter()
                    .map(|item| value_from_json(inner, item, registry))
                    .collect::<CodecResult<_>>()?,
            )),
            other => Err(CodecError::mismatch(ty.label(), json_kind(other))),
        },
        IdlType::Option(inner) => match j {
            Json::Null => Ok(Value::none()),
            other => Ok(Value::some(value_from_json(inner, other, registry)?)),
        },
        IdlType::Array(inner, n) => match j {
            Json::Array(items) if items.len() == *n => Ok(Value::Array(
                items
                    .iter()
                    .map(|item| value_from_json(inner, item, registry))
                    .collect::<CodecResult<_>>()?,
            )),
            Json::Array(items) => Err(CodecError::mismatch(
                ty.label(),
                format!("array of {}", items.len()),
            )),
            other => Err(CodecError::mismatch(ty.label(), json_kind(other))),
        },
        IdlType::Defined(name) => match registry.require(name)? {
            IdlTypeDefTy::Struct { fields } => Ok(Value::Struct(fields_from_json(fields, j, registry)?)),
            IdlTypeDefTy::Enum { variants } => enum_from_json(name, variants, j, registry),
        },
    }
}

/// Read a JSON object as the fields of a struct or instruction. Keys not
/// declared in `fields` are ignored.
pub fn fields_from_json(fields: &[IdlField], j: &Json, registry: &TypeRegistry) -> CodecResult<Fields> {
    let obj = j
        .as_object()
        .ok_or_else(|| CodecError::mismatch("object", json_kind(j)))?;
    fields
        .iter()
        .map(|f| {
            let v = obj
                .get(&f.name)
                .ok_or_else(|| CodecError::MissingField(f.name.clone()))?;
            Ok((f.name.clone(), value_from_json(&f.ty, v, registry)?))
        })
        .collect()
}

fn enum_from_json(
    name: &str,
    variants: &[IdlEnumVariant],
    j: &Json,
    registry: &TypeRegistry,
) -> CodecResult<Value> {
    let (key, payload) = match j {
        Json::String(s) => (s.as_str(), None),
        Json::Object(obj) if obj.len() == 1 => match obj.iter().next() {
            Some((k, v)) => (k.as_str(), Some(v)),
            None => return Err(CodecError::mismatch(format!("variant of {name}"), "empty object")),
        },
        other => {
            return Err(CodecError::mismatch(
                format!("variant of {name}"),
                json_kind(other),
            ))
        }
    };

    let variant = variants
        .iter()
        .find(|v| same_ident(&v.name, key))
        .ok_or_else(|| CodecError::mismatch(format!("variant of {name}"), key))?;

    let payload = match (&variant.fields, payload) {
        _ if variant.is_unit() => EnumPayload::Unit,
        (Some(EnumFields::Named(fields)), Some(p)) => EnumPayload::Named(fields_from_json(fields, p, registry)?),
        (Some(EnumFields::Tuple(types)), Some(Json::Array(items))) if items.len() == types.len() => {
            EnumPayload::Tuple(
                types
                    .iter()
                    .zip(items)
                    .map(|(t, item)| value_from_json(t, item, registry))
                    .collect::<CodecResult<_>>()?,
            )
        }
        _ => {
            return Err(CodecError::mismatch(
                format!("payload for {name}::{}", variant.name),
                payload.map_or("nothing", json_kind),
            ))
        }
    };

    Ok(Value::Enum(EnumValue {
        variant: variant.name.clone(),
        payload,
    }))
}

fn float_json(v: f64) -> Json {
    Number::from_f64(v).map_or(Json::Null, Json::Number)
}

/// Write a value as JSON.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Bool(v) => Json::Bool(*v),
        Value::U8(v) => json!(v),
        Value::I8(v) => json!(v),
        Value::U16(v) => json!(v),
        Value::I16(v) => json!(v),
        Value::U32(v) => json!(v),
        Value::I32(v) => json!(v),
        Value::U64(v) => Json::String(v.to_string()),
        Value::I64(v) => Json::String(v.to_string()),
        Value::U128(v) => Json::String(v.to_string()),
        Value::I128(v) => Json::String(v.to_string()),
        Value::F32(v) => float_json(f64::from(*v)),
        Value::F64(v) => float_json(*v),
        Value::Bytes(v) => json!(v),
        Value::String(v) => Json::String(v.clone()),
        Value::PublicKey(v) => Json::String(v.to_string()),
        Value::Vec(items) | Value::Array(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Option(None) => Json::Null,
        Value::Option(Some(v)) => value_to_json(v),
        Value::Struct(fields) => fields_to_json(fields),
        Value::Enum(ev) => {
            let payload = match &ev.payload {
                EnumPayload::Unit => Json::Object(Map::new()),
                EnumPayload::Named(fields) => fields_to_json(fields),
                EnumPayload::Tuple(items) => Json::Array(items.iter().map(value_to_json).collect()),
            };
            let mut obj = Map::new();
            obj.insert(ev.variant.clone(), payload);
            Json::Object(obj)
        }
    }
}

pub fn fields_to_json(fields: &Fields) -> Json {
    Json::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), value_to_json(v)))
            .collect(),
    )
}

/// `{"name": ..., "data": {...}}`.
pub fn instruction_to_json(ix: &Instruction) -> Json {
    json!({
        "name": ix.name,
        "data": fields_to_json(&ix.data),
    })
}
