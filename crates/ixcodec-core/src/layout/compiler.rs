//! Type resolver: turns IDL type references into [`Layout`]s.
//!
//! `resolve` is pure: defined references become `Layout::Defined(name)` after
//! checking the name exists, so resolution never expands a definition into
//! itself. The definitions are compiled once each into a [`TypeTable`] by
//! `build_table`, which follows references transitively from a set of roots
//! and then rejects definitions that would describe infinitely large values.

use std::collections::BTreeSet;

use tracing::trace;

use crate::errors::{CodecError, CodecResult};
use crate::idl::{EnumFields, IdlField, IdlType, IdlTypeDefTy, TypeRegistry};

use super::{EnumLayout, FieldLayout, Layout, PayloadLayout, StructLayout, TypeTable, VariantLayout};

/// Borsh enum tags are a single byte.
const MAX_ENUM_VARIANTS: usize = 256;

pub struct LayoutCompiler<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> LayoutCompiler<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn resolve(&self, ty: &IdlType) -> CodecResult<Layout> {
        Ok(match ty {
            IdlType::Primitive(p) => Layout::Primitive(*p),
            IdlType::Vec(inner) => Layout::Vec(Box::new(self.resolve(inner)?)),
            IdlType::Option(inner) => Layout::Option(Box::new(self.resolve(inner)?)),
            IdlType::Array(inner, n) => Layout::Array(Box::new(self.resolve(inner)?), *n),
            IdlType::Defined(name) => {
                self.registry.require(name)?;
                Layout::Defined(name.clone())
            }
        })
    }

    /// Compile an ordered field list (instruction args, struct fields).
    pub fn resolve_fields(&self, fields: &[IdlField]) -> CodecResult<StructLayout> {
        let fields = fields
            .iter()
            .map(|f| {
                Ok(FieldLayout {
                    name: f.name.clone(),
                    layout: self.resolve(&f.ty)?,
                })
            })
            .collect::<CodecResult<Vec<_>>>()?;
        Ok(StructLayout { fields })
    }

    /// Compile one type definition. Nested defined references stay deferred.
    pub fn resolve_def(&self, name: &str, def: &IdlTypeDefTy) -> CodecResult<Layout> {
        match def {
            IdlTypeDefTy::Struct { fields } => Ok(Layout::Struct(self.resolve_fields(fields)?)),
            IdlTypeDefTy::Enum { variants } => {
                if variants.len() > MAX_ENUM_VARIANTS {
                    return Err(CodecError::invalid_config(format!(
                        "enum {name} has {} variants, at most {MAX_ENUM_VARIANTS} are encodable",
                        variants.len()
                    )));
                }
                let variants = variants
                    .iter()
                    .map(|v| {
                        let payload = match &v.fields {
                            _ if v.is_unit() => PayloadLayout::Unit,
                            None => PayloadLayout::Unit,
                            Some(EnumFields::Named(fields)) => PayloadLayout::Named(self.resolve_fields(fields)?),
                            Some(EnumFields::Tuple(types)) => PayloadLayout::Tuple(
                                types.iter().map(|t| self.resolve(t)).collect::<CodecResult<Vec<_>>>()?,
                            ),
                        };
                        Ok(VariantLayout {
                            name: v.name.clone(),
                            payload,
                        })
                    })
                    .collect::<CodecResult<Vec<_>>>()?;
                Ok(Layout::Enum(EnumLayout {
                    name: name.to_string(),
                    variants,
                }))
            }
        }
    }

    /// Compile every definition reachable from `roots`, memoizing by name.
    pub fn build_table<'l>(&self, roots: impl IntoIterator<Item = &'l Layout>) -> CodecResult<TypeTable> {
        let mut pending = BTreeSet::new();
        for root in roots {
            root.defined_refs(&mut pending);
        }
        self.build_table_from_names(pending)
    }

    /// Compile every definition in the registry.
    pub fn build_full_table(&self) -> CodecResult<TypeTable> {
        self.build_table_from_names(self.registry.names().map(str::to_string).collect())
    }

    fn build_table_from_names(&self, mut pending: BTreeSet<String>) -> CodecResult<TypeTable> {
        let mut table = TypeTable::default();
        while let Some(name) = pending.pop_first() {
            if table.contains(&name) {
                continue;
            }
            let def = self.registry.require(&name)?;
            let layout = self.resolve_def(&name, def)?;

            let mut refs = BTreeSet::new();
            layout.defined_refs(&mut refs);
            pending.extend(refs.into_iter().filter(|r| !table.contains(r) && *r != name));

            trace!(type_name = %name, "compiled type layout");
            table.insert(name, layout);
        }

        table.check_inline_cycles()?;
        Ok(table)
    }
}
