//! Compiled binary layouts.
//!
//! A [`Layout`] is the compiled form of a type reference. It encodes and
//! decodes [`Value`]s using the Borsh wire format:
//! - primitives: delegated to `borsh` (little-endian integers, u32-prefixed
//!   strings and byte vectors, raw 32-byte public keys)
//! - `Vec`: u32 count followed by the elements
//! - `Option`: tag byte 0 (absent) or 1 (present) followed by the value
//! - `Array`: exactly `n` elements, no prefix
//! - `Struct`: fields in declaration order
//! - `Enum`: u8 variant index followed by the variant payload
//! - `Defined`: a deferred reference into a [`TypeTable`]
//!
//! Layouts are immutable; every call carries its own [`LayoutCtx`].

use std::collections::{BTreeMap, BTreeSet};

use borsh::{BorshDeserialize, BorshSerialize};

use crate::case::same_ident;
use crate::errors::{CodecError, CodecResult};
use crate::idl::Primitive;
use crate::value::{EnumPayload, EnumValue, Fields, PublicKey, Value};

pub mod compiler;

pub use compiler::LayoutCompiler;

#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    Primitive(Primitive),
    Vec(Box<Layout>),
    Option(Box<Layout>),
    Array(Box<Layout>, usize),
    Struct(StructLayout),
    Enum(EnumLayout),
    Defined(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructLayout {
    pub fields: Vec<FieldLayout>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldLayout {
    pub name: String,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumLayout {
    pub name: String,
    pub variants: Vec<VariantLayout>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantLayout {
    pub name: String,
    pub payload: PayloadLayout,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PayloadLayout {
    Unit,
    Named(StructLayout),
    Tuple(Vec<Layout>),
}

/// Compiled layouts of defined types, keyed by type name.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    layouts: BTreeMap<String, Layout>,
}

impl TypeTable {
    pub fn get(&self, name: &str) -> Option<&Layout> {
        self.layouts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layouts.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub(crate) fn insert(&mut self, name: String, layout: Layout) {
        self.layouts.insert(name, layout);
    }

    fn require(&self, name: &str) -> CodecResult<&Layout> {
        self.get(name)
            .ok_or_else(|| CodecError::UnresolvedType(name.to_string()))
    }

    /// Reject definitions that contain themselves without an indirection
    /// point. Vec, Option and enum variants bound recursion by the data;
    /// struct fields, arrays and tuple members do not.
    pub(crate) fn check_inline_cycles(&self) -> CodecResult<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            InProgress,
            Done,
        }

        fn visit(table: &TypeTable, name: &str, marks: &mut BTreeMap<String, Mark>) -> CodecResult<()> {
            match marks.get(name) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::InProgress) => return Err(CodecError::RecursiveType(name.to_string())),
                None => {}
            }
            marks.insert(name.to_string(), Mark::InProgress);

            if let Some(layout) = table.get(name) {
                let mut refs = BTreeSet::new();
                layout.inline_refs(&mut refs);
                for r in &refs {
                    visit(table, r, marks)?;
                }
            }

            marks.insert(name.to_string(), Mark::Done);
            Ok(())
        }

        let mut marks = BTreeMap::new();
        for name in self.layouts.keys() {
            visit(self, name, &mut marks)?;
        }
        Ok(())
    }
}

/// Per-call state for encoding and decoding. `max_depth` bounds how many
/// defined types a decode may be nested inside.
#[derive(Debug, Clone, Copy)]
pub struct LayoutCtx<'a> {
    pub types: &'a TypeTable,
    pub max_depth: usize,
}

impl<'a> LayoutCtx<'a> {
    pub fn new(types: &'a TypeTable, max_depth: usize) -> Self {
        Self { types, max_depth }
    }

    fn enter(&self, depth: usize) -> CodecResult<usize> {
        if depth >= self.max_depth {
            return Err(CodecError::DepthExceeded(self.max_depth));
        }
        Ok(depth + 1)
    }
}

impl Layout {
    /// Names of defined types referenced anywhere in this layout.
    pub fn defined_refs(&self, out: &mut BTreeSet<String>) {
        match self {
            Layout::Primitive(_) => {}
            Layout::Vec(inner) | Layout::Option(inner) | Layout::Array(inner, _) => inner.defined_refs(out),
            Layout::Struct(s) => s.defined_refs(out),
            Layout::Enum(e) => {
                for v in &e.variants {
                    match &v.payload {
                        PayloadLayout::Unit => {}
                        PayloadLayout::Named(s) => s.defined_refs(out),
                        PayloadLayout::Tuple(items) => items.iter().for_each(|l| l.defined_refs(out)),
                    }
                }
            }
            Layout::Defined(name) => {
                out.insert(name.clone());
            }
        }
    }

    /// Defined references reachable without passing an indirection point.
    fn inline_refs(&self, out: &mut BTreeSet<String>) {
        match self {
            Layout::Primitive(_) | Layout::Vec(_) | Layout::Option(_) | Layout::Enum(_) => {}
            Layout::Array(inner, _) => inner.inline_refs(out),
            Layout::Struct(s) => s.fields.iter().for_each(|f| f.layout.inline_refs(out)),
            Layout::Defined(name) => {
                out.insert(name.clone());
            }
        }
    }

    /// Encoded size when every value of this layout has the same size.
    pub fn fixed_size(&self, types: &TypeTable) -> Option<usize> {
        self.fixed_size_inner(types, &mut Vec::new())
    }

    fn fixed_size_inner(&self, types: &TypeTable, visiting: &mut Vec<String>) -> Option<usize> {
        match self {
            Layout::Primitive(p) => p.fixed_size(),
            Layout::Vec(_) | Layout::Option(_) => None,
            Layout::Array(inner, n) => inner.fixed_size_inner(types, visiting)?.checked_mul(*n),
            Layout::Struct(s) => s.fixed_size_inner(types, visiting),
            Layout::Enum(e) => {
                let mut size: Option<usize> = None;
                for v in &e.variants {
                    let payload = match &v.payload {
                        PayloadLayout::Unit => 0,
                        PayloadLayout::Named(s) => s.fixed_size_inner(types, visiting)?,
                        PayloadLayout::Tuple(items) => items
                            .iter()
                            .map(|l| l.fixed_size_inner(types, visiting))
                            .sum::<Option<usize>>()?,
                    };
                    match size {
                        Some(s) if s != payload => return None,
                        _ => size = Some(payload),
                    }
                }
                Some(1 + size.unwrap_or(0))
            }
            Layout::Defined(name) => {
                if visiting.iter().any(|n| n == name) {
                    return None;
                }
                visiting.push(name.clone());
                let size = types.get(name)?.fixed_size_inner(types, visiting);
                visiting.pop();
                size
            }
        }
    }

    /// Smallest possible encoding. Used to reject impossible collection
    /// lengths before allocating.
    fn min_size(&self, types: &TypeTable) -> usize {
        match self {
            Layout::Primitive(p) => p.fixed_size().unwrap_or(4),
            Layout::Vec(_) => 4,
            Layout::Option(_) | Layout::Enum(_) => 1,
            Layout::Array(inner, n) => inner.min_size(types).saturating_mul(*n),
            Layout::Struct(s) => s.fields.iter().map(|f| f.layout.min_size(types)).sum(),
            Layout::Defined(name) => types.get(name).map(|l| l.min_size(types)).unwrap_or(0),
        }
    }

    pub fn encode(&self, value: &Value, cx: &LayoutCtx<'_>, out: &mut Vec<u8>) -> CodecResult<()> {
        self.encode_at(value, cx, out)
    }

    pub fn decode(&self, buf: &mut &[u8], cx: &LayoutCtx<'_>) -> CodecResult<Value> {
        self.decode_at(buf, cx, 0)
    }

    fn encode_at(&self, value: &Value, cx: &LayoutCtx<'_>, out: &mut Vec<u8>) -> CodecResult<()> {
        match (self, value) {
            (Layout::Primitive(p), v) => encode_primitive(*p, v, out),
            (Layout::Vec(inner), Value::Vec(items)) => {
                let len = u32::try_from(items.len())
                    .map_err(|_| CodecError::malformed("vector longer than u32::MAX"))?;
                if !items.is_empty() && inner.min_size(cx.types) == 0 {
                    return Err(CodecError::malformed("vector of zero-sized elements"));
                }
                len.serialize(out)?;
                for item in items {
                    inner.encode_at(item, cx, out)?;
                }
                Ok(())
            }
            (Layout::Option(_), Value::Option(None)) => Ok(0u8.serialize(out)?),
            (Layout::Option(inner), Value::Option(Some(v))) => {
                1u8.serialize(out)?;
                inner.encode_at(v, cx, out)
            }
            (Layout::Array(inner, n), Value::Array(items)) => {
                if items.len() != *n {
                    return Err(CodecError::mismatch(
                        format!("array of {n}"),
                        format!("array of {}", items.len()),
                    ));
                }
                for item in items {
                    inner.encode_at(item, cx, out)?;
                }
                Ok(())
            }
            (Layout::Struct(s), Value::Struct(fields)) => s.encode_at(fields, cx, out),
            (Layout::Enum(e), Value::Enum(ev)) => e.encode_at(ev, cx, out),
            (Layout::Defined(name), v) => cx.types.require(name)?.encode_at(v, cx, out),
            (layout, v) => Err(CodecError::mismatch(layout.kind(), v.kind())),
        }
    }

    fn decode_at(&self, buf: &mut &[u8], cx: &LayoutCtx<'_>, depth: usize) -> CodecResult<Value> {
        match self {
            Layout::Primitive(p) => decode_primitive(*p, buf),
            Layout::Vec(inner) => {
                let len = u32::deserialize(buf)? as usize;
                let min = inner.min_size(cx.types);
                if min == 0 && len > 0 {
                    return Err(CodecError::malformed(format!(
                        "vector of {len} zero-sized elements"
                    )));
                }
                if len.saturating_mul(min) > buf.len() {
                    return Err(CodecError::malformed(format!(
                        "vector length {len} exceeds remaining {} bytes",
                        buf.len()
                    )));
                }
                let mut items = Vec::with_capacity(len.min(buf.len()));
                for _ in 0..len {
                    items.push(inner.decode_at(buf, cx, depth)?);
                }
                Ok(Value::Vec(items))
            }
            Layout::Option(inner) => match u8::deserialize(buf)? {
                0 => Ok(Value::Option(None)),
                1 => Ok(Value::some(inner.decode_at(buf, cx, depth)?)),
                tag => Err(CodecError::InvalidTag { kind: "option", tag, max: 2 }),
            },
            Layout::Array(inner, n) => {
                let mut items = Vec::with_capacity((*n).min(buf.len()));
                for _ in 0..*n {
                    items.push(inner.decode_at(buf, cx, depth)?);
                }
                Ok(Value::Array(items))
            }
            Layout::Struct(s) => Ok(Value::Struct(s.decode_at(buf, cx, depth)?)),
            Layout::Enum(e) => e.decode_at(buf, cx, depth),
            Layout::Defined(name) => {
                let depth = cx.enter(depth)?;
                cx.types.require(name)?.decode_at(buf, cx, depth)
            }
        }
    }

    fn kind(&self) -> String {
        match self {
            Layout::Primitive(p) => p.label().to_string(),
            Layout::Vec(_) => "vec".to_string(),
            Layout::Option(_) => "option".to_string(),
            Layout::Array(_, n) => format!("array of {n}"),
            Layout::Struct(_) => "struct".to_string(),
            Layout::Enum(e) => format!("enum {}", e.name),
            Layout::Defined(name) => name.clone(),
        }
    }
}

impl StructLayout {
    fn defined_refs(&self, out: &mut BTreeSet<String>) {
        self.fields.iter().for_each(|f| f.layout.defined_refs(out));
    }

    pub fn fixed_size(&self, types: &TypeTable) -> Option<usize> {
        self.fixed_size_inner(types, &mut Vec::new())
    }

    fn fixed_size_inner(&self, types: &TypeTable, visiting: &mut Vec<String>) -> Option<usize> {
        self.fields
            .iter()
            .map(|f| f.layout.fixed_size_inner(types, visiting))
            .sum()
    }

    /// Encode `fields` in declaration order. Extra keys are ignored.
    pub fn encode(&self, fields: &Fields, cx: &LayoutCtx<'_>, out: &mut Vec<u8>) -> CodecResult<()> {
        self.encode_at(fields, cx, out)
    }

    pub fn decode(&self, buf: &mut &[u8], cx: &LayoutCtx<'_>) -> CodecResult<Fields> {
        self.decode_at(buf, cx, 0)
    }

    fn encode_at(&self, fields: &Fields, cx: &LayoutCtx<'_>, out: &mut Vec<u8>) -> CodecResult<()> {
        for f in &self.fields {
            let v = fields
                .get(&f.name)
                .ok_or_else(|| CodecError::MissingField(f.name.clone()))?;
            f.layout.encode_at(v, cx, out)?;
        }
        Ok(())
    }

    fn decode_at(&self, buf: &mut &[u8], cx: &LayoutCtx<'_>, depth: usize) -> CodecResult<Fields> {
        let mut fields = Fields::new();
        for f in &self.fields {
            fields.insert(f.name.clone(), f.layout.decode_at(buf, cx, depth)?);
        }
        Ok(fields)
    }
}

impl EnumLayout {
    fn encode_at(&self, ev: &EnumValue, cx: &LayoutCtx<'_>, out: &mut Vec<u8>) -> CodecResult<()> {
        let (index, variant) = self
            .variants
            .iter()
            .enumerate()
            .find(|(_, v)| same_ident(&v.name, &ev.variant))
            .ok_or_else(|| CodecError::mismatch(format!("variant of {}", self.name), ev.variant.clone()))?;

        // Variant count is capped at 256 by the compiler.
        (index as u8).serialize(out)?;

        match (&variant.payload, &ev.payload) {
            (PayloadLayout::Unit, EnumPayload::Unit) => Ok(()),
            (PayloadLayout::Unit, EnumPayload::Named(f)) if f.is_empty() => Ok(()),
            (PayloadLayout::Unit, EnumPayload::Tuple(t)) if t.is_empty() => Ok(()),
            (PayloadLayout::Named(s), EnumPayload::Named(fields)) => s.encode_at(fields, cx, out),
            (PayloadLayout::Named(s), EnumPayload::Unit) if s.fields.is_empty() => Ok(()),
            (PayloadLayout::Tuple(items), EnumPayload::Tuple(values)) => {
                if items.len() != values.len() {
                    return Err(CodecError::mismatch(
                        format!("{} tuple fields for {}", items.len(), variant.name),
                        format!("{} values", values.len()),
                    ));
                }
                for (layout, v) in items.iter().zip(values) {
                    layout.encode_at(v, cx, out)?;
                }
                Ok(())
            }
            (expected, _) => Err(CodecError::mismatch(
                format!("{} payload for {}::{}", expected.kind(), self.name, variant.name),
                ev.payload.kind(),
            )),
        }
    }

    fn decode_at(&self, buf: &mut &[u8], cx: &LayoutCtx<'_>, depth: usize) -> CodecResult<Value> {
        let tag = u8::deserialize(buf)?;
        let variant = self.variants.get(tag as usize).ok_or(CodecError::InvalidTag {
            kind: "enum",
            tag,
            max: self.variants.len(),
        })?;

        let payload = match &variant.payload {
            PayloadLayout::Unit => EnumPayload::Unit,
            PayloadLayout::Named(s) => EnumPayload::Named(s.decode_at(buf, cx, depth)?),
            PayloadLayout::Tuple(items) => {
                let mut values = Vec::with_capacity(items.len());
                for layout in items {
                    values.push(layout.decode_at(buf, cx, depth)?);
                }
                EnumPayload::Tuple(values)
            }
        };

        Ok(Value::Enum(EnumValue {
            variant: variant.name.clone(),
            payload,
        }))
    }
}

impl PayloadLayout {
    fn kind(&self) -> &'static str {
        match self {
            PayloadLayout::Unit => "unit",
            PayloadLayout::Named(_) => "named",
            PayloadLayout::Tuple(_) => "tuple",
        }
    }
}

impl EnumPayload {
    fn kind(&self) -> &'static str {
        match self {
            EnumPayload::Unit => "unit",
            EnumPayload::Named(_) => "named",
            EnumPayload::Tuple(_) => "tuple",
        }
    }
}

fn encode_primitive(p: Primitive, value: &Value, out: &mut Vec<u8>) -> CodecResult<()> {
    match (p, value) {
        (Primitive::Bool, Value::Bool(v)) => v.serialize(out)?,
        (Primitive::U8, Value::U8(v)) => v.serialize(out)?,
        (Primitive::I8, Value::I8(v)) => v.serialize(out)?,
        (Primitive::U16, Value::U16(v)) => v.serialize(out)?,
        (Primitive::I16, Value::I16(v)) => v.serialize(out)?,
        (Primitive::U32, Value::U32(v)) => v.serialize(out)?,
        (Primitive::I32, Value::I32(v)) => v.serialize(out)?,
        (Primitive::F32, Value::F32(v)) => v.serialize(out)?,
        (Primitive::U64, Value::U64(v)) => v.serialize(out)?,
        (Primitive::I64, Value::I64(v)) => v.serialize(out)?,
        (Primitive::F64, Value::F64(v)) => v.serialize(out)?,
        (Primitive::U128, Value::U128(v)) => v.serialize(out)?,
        (Primitive::I128, Value::I128(v)) => v.serialize(out)?,
        (Primitive::Bytes, Value::Bytes(v)) => v.serialize(out)?,
        (Primitive::String, Value::String(v)) => v.serialize(out)?,
        (Primitive::PublicKey, Value::PublicKey(v)) => v.serialize(out)?,
        (p, v) => return Err(CodecError::mismatch(p.label(), v.kind())),
    }
    Ok(())
}

fn decode_primitive(p: Primitive, buf: &mut &[u8]) -> CodecResult<Value> {
    Ok(match p {
        Primitive::Bool => Value::Bool(bool::deserialize(buf)?),
        Primitive::U8 => Value::U8(u8::deserialize(buf)?),
        Primitive::I8 => Value::I8(i8::deserialize(buf)?),
        Primitive::U16 => Value::U16(u16::deserialize(buf)?),
        Primitive::I16 => Value::I16(i16::deserialize(buf)?),
        Primitive::U32 => Value::U32(u32::deserialize(buf)?),
        Primitive::I32 => Value::I32(i32::deserialize(buf)?),
        Primitive::F32 => Value::F32(f32::deserialize(buf)?),
        Primitive::U64 => Value::U64(u64::deserialize(buf)?),
        Primitive::I64 => Value::I64(i64::deserialize(buf)?),
        Primitive::F64 => Value::F64(f64::deserialize(buf)?),
        Primitive::U128 => Value::U128(u128::deserialize(buf)?),
        Primitive::I128 => Value::I128(i128::deserialize(buf)?),
        Primitive::Bytes => Value::Bytes(Vec::<u8>::deserialize(buf)?),
        Primitive::String => Value::String(String::deserialize(buf)?),
        Primitive::PublicKey => Value::PublicKey(PublicKey::deserialize(buf)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn ctx(types: &TypeTable) -> LayoutCtx<'_> {
        LayoutCtx::new(types, 16)
    }

    fn roundtrip(layout: &Layout, value: Value) -> Vec<u8> {
        let types = TypeTable::default();
        let cx = ctx(&types);
        let mut out = Vec::new();
        layout.encode(&value, &cx, &mut out).unwrap();
        let mut buf = out.as_slice();
        assert_eq!(layout.decode(&mut buf, &cx).unwrap(), value);
        assert!(buf.is_empty());
        out
    }

    #[test]
    fn absent_option_is_one_byte() {
        let layout = Layout::Option(Box::new(Layout::Primitive(Primitive::U64)));
        assert_eq!(roundtrip(&layout, Value::none()), vec![0]);
        assert_eq!(roundtrip(&layout, Value::some(Value::U64(1))), vec![1, 1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn absent_option_consumes_no_inner_bytes() {
        let types = TypeTable::default();
        let layout = Layout::Struct(StructLayout {
            fields: vec![
                FieldLayout { name: "a".into(), layout: Layout::Option(Box::new(Layout::Primitive(Primitive::U64))) },
                FieldLayout { name: "b".into(), layout: Layout::Primitive(Primitive::U8) },
            ],
        });
        let mut buf: &[u8] = &[0, 9];
        let v = layout.decode(&mut buf, &ctx(&types)).unwrap();
        assert_eq!(v, Value::structure([("a", Value::none()), ("b", Value::U8(9))]));
    }

    #[test]
    fn empty_vec_is_zero_prefix() {
        let layout = Layout::Vec(Box::new(Layout::Primitive(Primitive::PublicKey)));
        assert_eq!(roundtrip(&layout, Value::Vec(vec![])), vec![0, 0, 0, 0]);
    }

    #[test]
    fn array_has_no_prefix() {
        let layout = Layout::Array(Box::new(Layout::Primitive(Primitive::U16)), 2);
        assert_eq!(roundtrip(&layout, Value::Array(vec![Value::U16(1), Value::U16(2)])), vec![1, 0, 2, 0]);
    }

    #[test]
    fn array_length_mismatch_rejected() {
        let types = TypeTable::default();
        let layout = Layout::Array(Box::new(Layout::Primitive(Primitive::U8)), 2);
        let err = layout
            .encode(&Value::Array(vec![Value::U8(1)]), &ctx(&types), &mut Vec::new())
            .unwrap_err();
        assert_matches!(err, CodecError::TypeMismatch { .. });
    }

    #[test]
    fn string_and_bytes_use_u32_prefix() {
        assert_eq!(roundtrip(&Layout::Primitive(Primitive::String), "hi".into()), vec![2, 0, 0, 0, b'h', b'i']);
        assert_eq!(roundtrip(&Layout::Primitive(Primitive::Bytes), Value::Bytes(vec![7])), vec![1, 0, 0, 0, 7]);
    }

    #[test]
    fn enum_tag_and_payload() {
        let layout = Layout::Enum(EnumLayout {
            name: "State".into(),
            variants: vec![
                VariantLayout { name: "Idle".into(), payload: PayloadLayout::Unit },
                VariantLayout {
                    name: "Pair".into(),
                    payload: PayloadLayout::Tuple(vec![
                        Layout::Primitive(Primitive::U8),
                        Layout::Primitive(Primitive::Bool),
                    ]),
                },
            ],
        });
        assert_eq!(roundtrip(&layout, Value::unit_variant("Idle")), vec![0]);
        assert_eq!(
            roundtrip(&layout, Value::tuple_variant("Pair", vec![Value::U8(5), Value::Bool(true)])),
            vec![1, 5, 1]
        );
    }

    #[test]
    fn invalid_tags_are_malformed() {
        let types = TypeTable::default();
        let opt = Layout::Option(Box::new(Layout::Primitive(Primitive::U8)));
        assert_matches!(
            opt.decode(&mut &[2u8][..], &ctx(&types)),
            Err(CodecError::InvalidTag { kind: "option", tag: 2, .. })
        );

        let e = Layout::Enum(EnumLayout {
            name: "E".into(),
            variants: vec![VariantLayout { name: "A".into(), payload: PayloadLayout::Unit }],
        });
        assert_matches!(
            e.decode(&mut &[1u8][..], &ctx(&types)),
            Err(CodecError::InvalidTag { kind: "enum", tag: 1, max: 1 })
        );
    }

    #[test]
    fn short_input_is_malformed() {
        let types = TypeTable::default();
        let layout = Layout::Primitive(Primitive::U64);
        assert_matches!(layout.decode(&mut &[1u8, 2][..], &ctx(&types)), Err(CodecError::Malformed(_)));
    }

    #[test]
    fn oversized_vec_length_rejected_before_allocation() {
        let types = TypeTable::default();
        let layout = Layout::Vec(Box::new(Layout::Primitive(Primitive::U64)));
        let mut buf: &[u8] = &[0xff, 0xff, 0xff, 0xff, 0];
        assert_matches!(layout.decode(&mut buf, &ctx(&types)), Err(CodecError::Malformed(_)));
    }

    fn node_table() -> TypeTable {
        let mut types = TypeTable::default();
        types.insert(
            "Node".into(),
            Layout::Struct(StructLayout {
                fields: vec![FieldLayout {
                    name: "children".into(),
                    layout: Layout::Vec(Box::new(Layout::Defined("Node".into()))),
                }],
            }),
        );
        types
    }

    fn nested_nodes(levels: usize) -> Value {
        let mut node = Value::structure([("children", Value::Vec(vec![]))]);
        for _ in 1..levels {
            node = Value::structure([("children", Value::Vec(vec![node]))]);
        }
        node
    }

    #[test]
    fn depth_counts_defined_types_only() {
        let types = node_table();
        let cx = ctx(&types);
        let root = Layout::Defined("Node".into());

        let mut out = Vec::new();
        root.encode(&nested_nodes(16), &cx, &mut out).unwrap();
        assert_eq!(root.decode(&mut out.as_slice(), &cx).unwrap(), nested_nodes(16));

        let mut out = Vec::new();
        root.encode(&nested_nodes(40), &cx, &mut out).unwrap();
        assert_matches!(root.decode(&mut out.as_slice(), &cx), Err(CodecError::DepthExceeded(16)));
    }

    #[test]
    fn inline_nesting_is_not_limited() {
        let mut layout = Layout::Primitive(Primitive::U8);
        let mut value = Value::U8(1);
        for _ in 0..40 {
            layout = Layout::Option(Box::new(layout));
            value = Value::some(value);
        }
        roundtrip(&layout, value);
    }

    #[test]
    fn zero_sized_vec_elements_rejected() {
        let mut types = TypeTable::default();
        types.insert("Empty".into(), Layout::Struct(StructLayout { fields: vec![] }));
        let cx = ctx(&types);

        let count = 5_000_000u32.to_le_bytes();
        let empty = Layout::Vec(Box::new(Layout::Defined("Empty".into())));
        assert_matches!(empty.decode(&mut &count[..], &cx), Err(CodecError::Malformed(_)));
        let no_bytes = Layout::Vec(Box::new(Layout::Array(Box::new(Layout::Primitive(Primitive::U8)), 0)));
        assert_matches!(no_bytes.decode(&mut &count[..], &cx), Err(CodecError::Malformed(_)));

        let err = empty
            .encode(&Value::Vec(vec![Value::Struct(Fields::new())]), &cx, &mut Vec::new())
            .unwrap_err();
        assert_matches!(err, CodecError::Malformed(_));
        assert_eq!(roundtrip(&no_bytes, Value::Vec(vec![])), vec![0, 0, 0, 0]);
    }

    #[test]
    fn value_shape_mismatch() {
        let types = TypeTable::default();
        let err = Layout::Primitive(Primitive::U64)
            .encode(&Value::U32(1), &ctx(&types), &mut Vec::new())
            .unwrap_err();
        assert_matches!(err, CodecError::TypeMismatch { .. });
    }

    #[test]
    fn fixed_sizes() {
        let types = TypeTable::default();
        let s = Layout::Struct(StructLayout {
            fields: vec![
                FieldLayout { name: "k".into(), layout: Layout::Primitive(Primitive::PublicKey) },
                FieldLayout {
                    name: "a".into(),
                    layout: Layout::Array(Box::new(Layout::Primitive(Primitive::U16)), 3),
                },
            ],
        });
        assert_eq!(s.fixed_size(&types), Some(38));
        assert_eq!(Layout::Primitive(Primitive::String).fixed_size(&types), None);
    }
}
