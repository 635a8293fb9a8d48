//! Shared command-line plumbing for the analysis binaries.
use std::io::Read;
use std::str::FromStr;

use anyhow::{Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Dot,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "dot" => Ok(OutputFormat::Dot),
            other => Err(format!("unsupported format '{}'", other)),
        }
    }
}

pub fn read_stdin() -> Result<String> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read standard input")?;
    Ok(input)
}

/// Logging is opt-in through the environment, e.g. `ITPN_LOG=debug`.
pub fn init_logger() {
    let env = env_logger::Env::new()
        .filter("ITPN_LOG")
        .write_style("ITPN_LOG_STYLE");
    let _ = env_logger::Builder::from_env(env).try_init();
}
