use std::sync::Arc;

use crate::config::{validate_config, CodecConfig};
use crate::errors::{CodecError, CodecResult};
use crate::idl::{Idl, TypeRegistry};
use crate::layout::{LayoutCompiler, LayoutCtx, TypeTable};
use crate::value::Value;

/// Encodes and decodes values of named IDL types, without any discriminator.
#[derive(Debug, Clone)]
pub struct TypesCoder {
    types: Arc<TypeTable>,
    config: CodecConfig,
}

impl TypesCoder {
    pub fn new(idl: &Idl) -> CodecResult<Self> {
        Self::with_config(idl, CodecConfig::default())
    }

    pub fn with_config(idl: &Idl, config: CodecConfig) -> CodecResult<Self> {
        validate_config(&config)?;
        let registry = TypeRegistry::from_idl(idl);
        let types = LayoutCompiler::new(&registry).build_full_table()?;
        Ok(Self::from_table(Arc::new(types), config))
    }

    pub(crate) fn from_table(types: Arc<TypeTable>, config: CodecConfig) -> Self {
        Self { types, config }
    }

    fn ctx(&self) -> LayoutCtx<'_> {
        LayoutCtx::new(&self.types, self.config.limits.max_depth)
    }

    pub fn encode(&self, type_name: &str, value: &Value) -> CodecResult<Vec<u8>> {
        let layout = self
            .types
            .get(type_name)
            .ok_or_else(|| CodecError::UnknownType(type_name.to_string()))?;
        let mut buf = Vec::with_capacity(self.config.encode_buffer_capacity);
        layout.encode(value, &self.ctx(), &mut buf)?;
        Ok(buf)
    }

    pub fn decode(&self, type_name: &str, mut data: &[u8]) -> CodecResult<Value> {
        let layout = self
            .types
            .get(type_name)
            .ok_or_else(|| CodecError::UnknownType(type_name.to_string()))?;
        if data.len() > self.config.limits.max_input_len {
            return Err(CodecError::malformed("type data exceeds input limit"));
        }
        layout.decode(&mut data, &self.ctx())
    }

    pub fn size(&self, type_name: &str) -> CodecResult<Option<usize>> {
        let layout = self
            .types
            .get(type_name)
            .ok_or_else(|| CodecError::UnknownType(type_name.to_string()))?;
        Ok(layout.fixed_size(&self.types))
    }
}
