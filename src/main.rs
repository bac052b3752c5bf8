use std::env;
use std::io::{self, BufRead};
use std::process;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use ecma_regex::{compile, CompiledPattern, Flags};

/// Minimal search driver around the engine: reads stdin, prints every line
/// the pattern matches at some position, exits 1 when nothing matched.
///
/// Usage: ecma-regex [-f FLAGS] PATTERN
/// FLAGS is a string of single-letter switches: u, i, m, s, n.
fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let mut flags = Flags::default();
    let mut pattern_arg = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-f" => {
                let value = args.next().context("-f requires a flag string")?;
                flags = Flags::from_str(&value)
                    .map_err(|e| anyhow::anyhow!(e))
                    .context("invalid flags")?;
            }
            _ if pattern_arg.is_none() => pattern_arg = Some(arg),
            other => bail!("unexpected argument {other:?}"),
        }
    }
    let pattern_str = pattern_arg.context("no pattern provided")?;
    log::debug!("pattern: {pattern_str:?}, flags: {flags:?}");

    let pattern = compile(&pattern_str, flags).context("invalid pattern")?;

    let mut matched_any = false;
    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        if search(&pattern, &line) {
            matched_any = true;
            println!("{line}");
        }
    }

    if !matched_any {
        process::exit(1);
    }
    Ok(())
}

/// Tries the pattern at every start position of `line`.
fn search(pattern: &CompiledPattern, line: &str) -> bool {
    let limit = if pattern.flags().unicode {
        line.chars().count()
    } else {
        line.encode_utf16().count()
    };
    (0..=limit).any(|start| pattern.execute(line, start).is_some())
}
