//! ixcodec-solana-client
//!
//! Off-chain wiring between an IDL-driven codec and Solana instructions.
//!
//! It includes:
//! - conversions between `solana_program` keys/metas and the codec's own types
//! - a program client that builds, decodes and formats instructions for one
//!   program id
//!
//! The program id is expected to be provided by the consumer.

pub mod convert;
pub mod program_client;

pub use convert::*;
pub use program_client::*;
