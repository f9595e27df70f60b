use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn init(json: bool) {
    JSON_MODE.store(json, Ordering::Relaxed);
}

pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

/// Print `value` as JSON in `--json` mode, otherwise run `human`.
pub fn emit<T, F>(value: &T, human: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(&mut StandardStream) -> io::Result<()>,
{
    if is_json() {
        let s = serde_json::to_string_pretty(value)?;
        println!("{s}");
        return Ok(());
    }
    let mut out = stdout();
    human(&mut out)?;
    out.reset()?;
    Ok(())
}

/// Write `label` in bold, followed by `value`.
pub fn field(out: &mut StandardStream, label: &str, value: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_bold(true))?;
    write!(out, "{label}:")?;
    out.reset()?;
    writeln!(out, " {value}")
}

pub fn heading(out: &mut StandardStream, text: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_bold(true).set_fg(Some(Color::Cyan)))?;
    writeln!(out, "{text}")?;
    out.reset()
}

pub fn dim(out: &mut StandardStream, text: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_dimmed(true))?;
    write!(out, "{text}")?;
    out.reset()
}

pub fn stdout() -> StandardStream {
    let choice = if io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}
