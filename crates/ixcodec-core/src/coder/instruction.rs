//! Instruction codec.
//!
//! Encodes `discriminator ++ borsh(args)` and routes raw instruction data back
//! to the instruction whose discriminator prefixes it.
//!
//! Decoding distinguishes two outcomes callers care about:
//! - `Ok(None)`: the prefix belongs to no instruction of this IDL
//! - `Err(_)`: the prefix matched but the body does not fit the layout

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::case::camel_case;
use crate::config::{validate_config, CodecConfig};
use crate::errors::{CodecError, CodecResult};
use crate::idl::{Idl, TypeRegistry};
use crate::layout::{LayoutCompiler, LayoutCtx, StructLayout, TypeTable};
use crate::value::Fields;

use super::discriminator::DiscriminatorTable;

/// A decoded instruction: canonical (camelCase) name plus argument values.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub name: String,
    pub data: Fields,
}

impl Instruction {
    pub fn new(name: impl Into<String>, data: Fields) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// How instruction data handed to `decode_as` is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataEncoding {
    #[default]
    Raw,
    Hex,
    Base58,
}

impl DataEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Hex => "hex",
            Self::Base58 => "base58",
        }
    }

    /// Turn `input` into raw bytes. Text encodings require UTF-8 input;
    /// surrounding whitespace and a `0x` prefix on hex are ignored.
    pub fn to_bytes<'a>(&self, input: &'a [u8]) -> CodecResult<Cow<'a, [u8]>> {
        let decoded = match self {
            Self::Raw => return Ok(Cow::Borrowed(input)),
            Self::Hex => {
                let text = self.text(input)?;
                hex::decode(text.strip_prefix("0x").unwrap_or(text)).map_err(|e| e.to_string())
            }
            Self::Base58 => bs58::decode(self.text(input)?)
                .into_vec()
                .map_err(|e| e.to_string()),
        };
        decoded
            .map(Cow::Owned)
            .map_err(|message| CodecError::InvalidEncoding {
                encoding: self.as_str(),
                message,
            })
    }

    fn text<'a>(&self, input: &'a [u8]) -> CodecResult<&'a str> {
        std::str::from_utf8(input)
            .map(str::trim)
            .map_err(|e| CodecError::InvalidEncoding {
                encoding: self.as_str(),
                message: e.to_string(),
            })
    }
}

impl FromStr for DataEncoding {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(Self::Raw),
            "hex" => Ok(Self::Hex),
            "base58" | "bs58" => Ok(Self::Base58),
            _ => Err(CodecError::invalid_config(format!("unsupported data encoding: {s}"))),
        }
    }
}

impl fmt::Display for DataEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiled instruction layouts plus the discriminator table.
#[derive(Debug, Clone)]
pub struct InstructionCoder {
    layouts: HashMap<String, StructLayout>,
    discriminators: DiscriminatorTable,
    types: Arc<TypeTable>,
    config: CodecConfig,
}

impl InstructionCoder {
    pub fn new(idl: &Idl) -> CodecResult<Self> {
        Self::with_config(idl, CodecConfig::default())
    }

    /// Build a coder that only compiles types reachable from instruction args.
    pub fn with_config(idl: &Idl, config: CodecConfig) -> CodecResult<Self> {
        validate_config(&config)?;
        let registry = TypeRegistry::from_idl(idl);
        let compiler = LayoutCompiler::new(&registry);

        let layouts = Self::compile_layouts(idl, &compiler)?;
        let types = compiler.build_table(
            layouts
                .values()
                .flat_map(|s| s.fields.iter().map(|f| &f.layout)),
        )?;

        Self::assemble(idl, layouts, Arc::new(types), config)
    }

    pub(crate) fn compile_layouts(
        idl: &Idl,
        compiler: &LayoutCompiler<'_>,
    ) -> CodecResult<HashMap<String, StructLayout>> {
        idl.instructions
            .iter()
            .map(|ix| Ok((camel_case(&ix.name), compiler.resolve_fields(&ix.args)?)))
            .collect()
    }

    pub(crate) fn assemble(
        idl: &Idl,
        layouts: HashMap<String, StructLayout>,
        types: Arc<TypeTable>,
        config: CodecConfig,
    ) -> CodecResult<Self> {
        let discriminators = DiscriminatorTable::build(&idl.instructions, &config.hashing)?;

        debug!(
            instructions = discriminators.count(),
            types = types.len(),
            discriminator_len = discriminators.len(),
            "instruction coder ready"
        );

        Ok(Self {
            layouts,
            discriminators,
            types,
            config,
        })
    }

    fn ctx(&self) -> LayoutCtx<'_> {
        LayoutCtx::new(&self.types, self.config.limits.max_depth)
    }

    /// Encode an instruction. The name may be given in any case style.
    pub fn encode(&self, name: &str, args: &Fields) -> CodecResult<Vec<u8>> {
        let key = camel_case(name);
        let layout = self
            .layouts
            .get(&key)
            .ok_or_else(|| CodecError::UnknownInstruction(name.to_string()))?;
        let discriminator = self
            .discriminators
            .get(&key)
            .ok_or_else(|| CodecError::UnknownInstruction(name.to_string()))?;

        let mut buf = Vec::with_capacity(self.config.encode_buffer_capacity.max(discriminator.len()));
        buf.extend_from_slice(discriminator);
        layout.encode(args, &self.ctx(), &mut buf)?;
        Ok(buf)
    }

    /// Decode raw instruction data.
    pub fn decode(&self, data: &[u8]) -> CodecResult<Option<Instruction>> {
        if data.is_empty() {
            return Ok(None);
        }
        if data.len() > self.config.limits.max_input_len {
            return Err(CodecError::malformed(format!(
                "input of {} bytes exceeds limit of {}",
                data.len(),
                self.config.limits.max_input_len
            )));
        }

        let len = self.discriminators.len();
        if data.len() < len {
            return Err(CodecError::malformed(format!(
                "input of {} bytes is shorter than the {len}-byte discriminator",
                data.len()
            )));
        }

        let (prefix, mut body) = data.split_at(len);
        let Some(name) = self.discriminators.lookup(prefix) else {
            trace!(prefix = %hex::encode(prefix), "no instruction matches discriminator");
            return Ok(None);
        };
        let layout = self
            .layouts
            .get(name)
            .ok_or_else(|| CodecError::UnknownInstruction(name.to_string()))?;

        let data = layout.decode(&mut body, &self.ctx())?;
        if !body.is_empty() {
            trace!(instruction = name, trailing = body.len(), "ignoring trailing bytes");
        }

        Ok(Some(Instruction {
            name: name.to_string(),
            data,
        }))
    }

    /// Decode instruction data given as raw bytes or text.
    pub fn decode_as(&self, input: &[u8], encoding: DataEncoding) -> CodecResult<Option<Instruction>> {
        let bytes = encoding.to_bytes(input)?;
        self.decode(&bytes)
    }

    pub fn decode_str(&self, text: &str, encoding: DataEncoding) -> CodecResult<Option<Instruction>> {
        self.decode_as(text.as_bytes(), encoding)
    }

    pub fn discriminator(&self, name: &str) -> Option<&[u8]> {
        self.discriminators.get(&camel_case(name))
    }

    pub fn discriminators(&self) -> &DiscriminatorTable {
        &self.discriminators
    }

    pub fn layout(&self, name: &str) -> Option<&StructLayout> {
        self.layouts.get(&camel_case(name))
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use assert_matches::assert_matches;

    const IDL: &str = r#"{
        "instructions": [
            {"name": "initialize", "accounts": [], "args": [
                {"name": "amount", "type": "u64"},
                {"name": "memo", "type": {"option": "string"}}
            ]},
            {"name": "set_authority", "accounts": [], "args": [
                {"name": "newAuthority", "type": "publicKey"}
            ]}
        ]
    }"#;

    fn coder() -> InstructionCoder {
        InstructionCoder::new(&Idl::from_json_str(IDL).unwrap()).unwrap()
    }

    fn init_args() -> Fields {
        let Value::Struct(f) = Value::structure([("amount", Value::U64(5)), ("memo", Value::none())]) else {
            unreachable!()
        };
        f
    }

    #[test]
    fn encode_prefixes_discriminator() {
        let c = coder();
        let data = c.encode("initialize", &init_args()).unwrap();
        assert_eq!(hex::encode(&data[..8]), "afaf6d1f0d989bed");
        assert_eq!(&data[8..], &[5, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn encode_accepts_any_case_style() {
        let c = coder();
        let mut args = Fields::new();
        args.insert("newAuthority".into(), Value::PublicKey(Default::default()));
        let a = c.encode("set_authority", &args).unwrap();
        let b = c.encode("setAuthority", &args).unwrap();
        assert_eq!(a, b);
        assert_eq!(c.decode(&a).unwrap().unwrap().name, "setAuthority");
    }

    #[test]
    fn unknown_instruction_on_encode() {
        assert_matches!(
            coder().encode("nope", &Fields::new()),
            Err(CodecError::UnknownInstruction(_))
        );
    }

    #[test]
    fn missing_argument_on_encode() {
        let mut args = init_args();
        args.remove("memo");
        assert_matches!(
            coder().encode("initialize", &args),
            Err(CodecError::MissingField(f)) if f == "memo"
        );
    }

    #[test]
    fn decode_routes_and_reports_misses() {
        let c = coder();
        let data = c.encode("initialize", &init_args()).unwrap();
        let ix = c.decode(&data).unwrap().unwrap();
        assert_eq!(ix, Instruction::new("initialize", init_args()));

        assert_eq!(c.decode(&[0u8; 16]).unwrap(), None);
        assert_eq!(c.decode(&[]).unwrap(), None);
        assert_matches!(c.decode(&[1, 2, 3]), Err(CodecError::Malformed(_)));
        assert_matches!(c.decode(&data[..10]), Err(CodecError::Malformed(_)));
    }

    #[test]
    fn decode_text_encodings() {
        let c = coder();
        let data = c.encode("initialize", &init_args()).unwrap();

        let hex_text = format!(" 0x{} ", hex::encode(&data));
        assert!(c.decode_str(&hex_text, DataEncoding::Hex).unwrap().is_some());

        let b58 = bs58::encode(&data).into_string();
        assert!(c.decode_str(&b58, DataEncoding::Base58).unwrap().is_some());

        assert_matches!(
            c.decode_str("zz", DataEncoding::Hex),
            Err(CodecError::InvalidEncoding { encoding: "hex", .. })
        );
    }

    #[test]
    fn input_limit_enforced() {
        let mut cfg = CodecConfig::default();
        cfg.limits.max_input_len = 12;
        let c = InstructionCoder::with_config(&Idl::from_json_str(IDL).unwrap(), cfg).unwrap();
        assert_matches!(c.decode(&[0u8; 13]), Err(CodecError::Malformed(_)));
    }

    #[test]
    fn encoding_names_parse() {
        assert_eq!("bs58".parse::<DataEncoding>().unwrap(), DataEncoding::Base58);
        assert_eq!("hex".parse::<DataEncoding>().unwrap(), DataEncoding::Hex);
        assert!("base64".parse::<DataEncoding>().is_err());
    }
}
