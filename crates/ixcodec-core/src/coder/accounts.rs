//! Account data coder.
//!
//! Account data is `discriminator ++ borsh(account)`, where the discriminator
//! is either declared in the IDL or the first bytes of
//! SHA-256(`"account:<Name>"`).

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::debug;

use crate::config::{validate_config, CodecConfig};
use crate::errors::{CodecError, CodecResult};
use crate::hash::{account_discriminator, discriminator_key};
use crate::idl::{Idl, IdlType, TypeRegistry};
use crate::layout::{Layout, LayoutCompiler, LayoutCtx, TypeTable};
use crate::value::Value;

#[derive(Debug, Clone)]
struct AccountLayout {
    discriminator: Vec<u8>,
    layout: Layout,
}

#[derive(Debug, Clone)]
pub struct AccountsCoder {
    accounts: BTreeMap<String, AccountLayout>,
    by_key: HashMap<String, String>,
    types: Arc<TypeTable>,
    config: CodecConfig,
}

impl AccountsCoder {
    pub fn new(idl: &Idl) -> CodecResult<Self> {
        Self::with_config(idl, CodecConfig::default())
    }

    pub fn with_config(idl: &Idl, config: CodecConfig) -> CodecResult<Self> {
        validate_config(&config)?;
        let registry = TypeRegistry::from_idl(idl);
        let compiler = LayoutCompiler::new(&registry);

        let layouts = Self::compile_layouts(idl, &compiler)?;
        let types = compiler.build_table(layouts.iter().map(|(_, l)| l))?;
        Self::assemble(idl, layouts, Arc::new(types), config)
    }

    pub(crate) fn compile_layouts(idl: &Idl, compiler: &LayoutCompiler<'_>) -> CodecResult<Vec<(String, Layout)>> {
        idl.accounts
            .iter()
            .map(|acc| {
                let layout = match &acc.ty {
                    Some(def) => compiler.resolve_def(&acc.name, def)?,
                    None => compiler.resolve(&IdlType::Defined(acc.name.clone()))?,
                };
                Ok((acc.name.clone(), layout))
            })
            .collect()
    }

    pub(crate) fn assemble(
        idl: &Idl,
        layouts: Vec<(String, Layout)>,
        types: Arc<TypeTable>,
        config: CodecConfig,
    ) -> CodecResult<Self> {
        let mut accounts = BTreeMap::new();
        let mut by_key = HashMap::new();
        let mut expected_len: Option<usize> = None;

        for (acc, (name, layout)) in idl.accounts.iter().zip(layouts) {
            let discriminator = acc
                .discriminator
                .clone()
                .unwrap_or_else(|| account_discriminator(&config.hashing, &name));
            if discriminator.is_empty() {
                return Err(CodecError::invalid_config(format!(
                    "account {name} has an empty discriminator"
                )));
            }

            match expected_len {
                None => expected_len = Some(discriminator.len()),
                Some(expected) if expected != discriminator.len() => {
                    return Err(CodecError::DiscriminatorLength {
                        name,
                        expected,
                        actual: discriminator.len(),
                    });
                }
                Some(_) => {}
            }

            let key = discriminator_key(&discriminator);
            if let Some(first) = by_key.insert(key, name.clone()) {
                return Err(CodecError::DuplicateDiscriminator {
                    discriminator: hex::encode(&discriminator),
                    first,
                    second: name,
                });
            }
            accounts.insert(name, AccountLayout { discriminator, layout });
        }

        debug!(accounts = accounts.len(), "accounts coder ready");
        Ok(Self {
            accounts,
            by_key,
            types,
            config,
        })
    }

    fn ctx(&self) -> LayoutCtx<'_> {
        LayoutCtx::new(&self.types, self.config.limits.max_depth)
    }

    fn get(&self, name: &str) -> CodecResult<&AccountLayout> {
        self.accounts
            .get(name)
            .ok_or_else(|| CodecError::UnknownAccount(name.to_string()))
    }

    pub fn discriminator(&self, name: &str) -> Option<&[u8]> {
        self.accounts.get(name).map(|a| a.discriminator.as_slice())
    }

    /// Account names in deterministic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.accounts.keys().map(String::as_str)
    }

    pub fn encode(&self, name: &str, account: &Value) -> CodecResult<Vec<u8>> {
        let acc = self.get(name)?;
        let mut buf = Vec::with_capacity(self.config.encode_buffer_capacity);
        buf.extend_from_slice(&acc.discriminator);
        acc.layout.encode(account, &self.ctx(), &mut buf)?;
        Ok(buf)
    }

    /// Decode account data, checking its discriminator.
    pub fn decode(&self, name: &str, data: &[u8]) -> CodecResult<Value> {
        let acc = self.get(name)?;
        if !data.starts_with(&acc.discriminator) {
            return Err(CodecError::malformed(format!(
                "account data does not start with the {name} discriminator"
            )));
        }
        self.decode_body(acc, &data[acc.discriminator.len()..])
    }

    /// Decode account data without checking its discriminator.
    pub fn decode_unchecked(&self, name: &str, data: &[u8]) -> CodecResult<Value> {
        let acc = self.get(name)?;
        let body = data.get(acc.discriminator.len()..).ok_or_else(|| {
            CodecError::malformed("account data shorter than its discriminator")
        })?;
        self.decode_body(acc, body)
    }

    /// Identify and decode account data of any known type.
    pub fn decode_any(&self, data: &[u8]) -> CodecResult<Option<(String, Value)>> {
        let Some(len) = self.accounts.values().next().map(|a| a.discriminator.len()) else {
            return Ok(None);
        };
        let Some(prefix) = data.get(..len) else {
            return Ok(None);
        };
        let Some(name) = self.by_key.get(&discriminator_key(prefix)) else {
            return Ok(None);
        };
        let acc = self.get(name)?;
        Ok(Some((name.clone(), self.decode_body(acc, &data[len..])?)))
    }

    fn decode_body(&self, acc: &AccountLayout, mut body: &[u8]) -> CodecResult<Value> {
        if body.len() > self.config.limits.max_input_len {
            return Err(CodecError::malformed("account data exceeds input limit"));
        }
        acc.layout.decode(&mut body, &self.ctx())
    }

    /// Total account size (discriminator included) for fixed-size accounts.
    pub fn size(&self, name: &str) -> CodecResult<Option<usize>> {
        let acc = self.get(name)?;
        Ok(acc
            .layout
            .fixed_size(&self.types)
            .map(|s| s + acc.discriminator.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::PublicKey;
    use assert_matches::assert_matches;

    const IDL: &str = r#"{
        "accounts": [
            {"name": "Counter", "type": {"kind": "struct", "fields": [
                {"name": "authority", "type": "publicKey"},
                {"name": "count", "type": "u64"}
            ]}},
            {"name": "Profile"}
        ],
        "types": [
            {"name": "Profile", "type": {"kind": "struct", "fields": [{"name": "handle", "type": "string"}]}}
        ]
    }"#;

    fn coder() -> AccountsCoder {
        AccountsCoder::new(&Idl::from_json_str(IDL).unwrap()).unwrap()
    }

    fn counter() -> Value {
        Value::structure([
            ("authority", Value::PublicKey(PublicKey([3; 32]))),
            ("count", Value::U64(7)),
        ])
    }

    #[test]
    fn discriminator_is_account_namespace_hash() {
        let c = coder();
        assert_eq!(hex::encode(c.discriminator("Counter").unwrap()), "ffb004f5bcfd7c19");
    }

    #[test]
    fn roundtrip_and_identify() {
        let c = coder();
        let data = c.encode("Counter", &counter()).unwrap();
        assert_eq!(data.len(), 8 + 32 + 8);
        assert_eq!(c.decode("Counter", &data).unwrap(), counter());
        assert_eq!(c.decode_any(&data).unwrap(), Some(("Counter".to_string(), counter())));
        assert_eq!(c.decode_any(&[0u8; 8]).unwrap(), None);
    }

    #[test]
    fn wrong_discriminator_rejected() {
        let c = coder();
        let data = c.encode("Counter", &counter()).unwrap();
        assert_matches!(c.decode("Profile", &data), Err(CodecError::Malformed(_)));
    }

    #[test]
    fn account_referencing_types_entry() {
        let c = coder();
        let profile = Value::structure([("handle", Value::from("x"))]);
        let data = c.encode("Profile", &profile).unwrap();
        assert_eq!(c.decode("Profile", &data).unwrap(), profile);
    }

    #[test]
    fn sizes() {
        let c = coder();
        assert_eq!(c.size("Counter").unwrap(), Some(48));
        assert_eq!(c.size("Profile").unwrap(), None);
        assert_matches!(c.size("Nope"), Err(CodecError::UnknownAccount(_)));
    }

    #[test]
    fn empty_explicit_discriminator_fails() {
        let idl = Idl::from_json_str(
            r#"{"accounts": [{"name": "Blank", "discriminator": [], "type": {"kind": "struct", "fields": []}}]}"#,
        )
        .unwrap();
        assert_matches!(AccountsCoder::new(&idl), Err(CodecError::InvalidConfig(_)));
    }
}
