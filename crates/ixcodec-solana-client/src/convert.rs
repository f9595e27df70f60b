//! Conversions between `solana_program` types and ixcodec-core types.
//!
//! Both sides are foreign to this crate, so these are plain functions rather
//! than `From` impls.

use ixcodec_core::format::AccountMeta as CodecAccountMeta;
use ixcodec_core::value::PublicKey;
use solana_program::instruction::AccountMeta;
use solana_program::pubkey::Pubkey;

pub fn to_pubkey(key: PublicKey) -> Pubkey {
    Pubkey::new_from_array(key.to_bytes())
}

pub fn from_pubkey(key: &Pubkey) -> PublicKey {
    PublicKey::new_from_array(key.to_bytes())
}

pub fn to_codec_meta(meta: &AccountMeta) -> CodecAccountMeta {
    CodecAccountMeta::new(from_pubkey(&meta.pubkey), meta.is_signer, meta.is_writable)
}

pub fn to_solana_meta(meta: &CodecAccountMeta) -> AccountMeta {
    AccountMeta {
        pubkey: to_pubkey(meta.pubkey),
        is_signer: meta.is_signer,
        is_writable: meta.is_writable,
    }
}
