//! Command-line argument parsing.
//!
//! ```text
//! writebox [FILE] [/e ENCODING | -e ENCODING | --encoding ENCODING] [--config PATH]
//! ```

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use writebox_core::TextEncoding;

/// A small tabbed plain-text editor
#[derive(Parser, Debug)]
#[command(name = "writebox", version, about = "A small tabbed plain-text editor")]
pub struct CliArgs {
    /// File to open
    #[arg(value_name = "FILE", value_parser = existing_path)]
    pub file: Option<PathBuf>,

    /// Decode FILE with this encoding instead of detecting it (`/e` also works)
    #[arg(short = 'e', long, value_name = "ENCODING", value_parser = encoding_label)]
    pub encoding: Option<TextEncoding>,

    /// YAML configuration file
    #[arg(long, value_name = "PATH", value_parser = existing_path)]
    pub config: Option<PathBuf>,
}

fn existing_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("no such file: {value}"))
    }
}

fn encoding_label(value: &str) -> Result<TextEncoding, String> {
    TextEncoding::for_label(value).map_err(|err| err.to_string())
}

/// Rewrite Windows-style `/e` into `--encoding` so clap understands it.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if arg == "/e" || arg == "/E" {
                OsString::from("--encoding")
            } else {
                arg
            }
        })
        .collect()
}

impl CliArgs {
    /// Parse the process arguments, exiting with a usage error on failure.
    pub fn from_env() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }
}
