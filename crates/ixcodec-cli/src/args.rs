use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use ixcodec_core::coder::DataEncoding;

#[derive(Parser, Debug, Clone)]
#[command(name = "ixcodec", version, about = "Encode, decode and format program instructions from an IDL")]
pub struct Cli {
    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct IdlArg {
    /// Path to the IDL JSON file.
    #[arg(long)]
    pub idl: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct DataArg {
    /// Instruction or account data.
    pub data: String,

    /// Encoding of DATA: hex|base58
    #[arg(long, default_value = "hex")]
    pub encoding: DataEncoding,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Encode instruction data from JSON arguments.
    Encode {
        #[command(flatten)]
        idl: IdlArg,

        /// Instruction name (any case style).
        name: String,

        /// Arguments as a JSON object, or @path to read them from a file.
        #[arg(long, default_value = "{}")]
        args: String,
    },

    /// Decode instruction data.
    Decode {
        #[command(flatten)]
        idl: IdlArg,
        #[command(flatten)]
        data: DataArg,
    },

    /// Decode instruction data and render it for display.
    Format {
        #[command(flatten)]
        idl: IdlArg,
        #[command(flatten)]
        data: DataArg,

        /// JSON file with the runtime accounts: [{"pubkey", "isSigner", "isWritable"}].
        #[arg(long)]
        accounts: Option<PathBuf>,
    },

    /// List instruction discriminators.
    Discriminators {
        #[command(flatten)]
        idl: IdlArg,
    },

    /// Decode account data.
    Account {
        #[command(flatten)]
        idl: IdlArg,
        #[command(flatten)]
        data: DataArg,

        /// Account type; detected from the discriminator when omitted.
        #[arg(long)]
        name: Option<String>,
    },
}
