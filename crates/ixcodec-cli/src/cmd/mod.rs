use anyhow::Result;

use crate::args::{Cli, Command};

mod account;
mod decode;
mod discriminators;
mod encode;
mod format;

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Encode { idl, name, args } => encode::run(&idl.idl, &name, &args),
        Command::Decode { idl, data } => decode::run(&idl.idl, &data.data, data.encoding),
        Command::Format { idl, data, accounts } => {
            format::run(&idl.idl, &data.data, data.encoding, accounts.as_deref())
        }
        Command::Discriminators { idl } => discriminators::run(&idl.idl),
        Command::Account { idl, data, name } => account::run(&idl.idl, &data.data, data.encoding, name.as_deref()),
    }
}
