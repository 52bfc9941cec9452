//! WriteBox command-line front end.
//!
//! ```bash
//! cargo run -p writebox -- notes.txt /e windows-1252
//! ```
//!
//! Commands are read from stdin one per line; type `help` for the list.

mod cli;
mod logging;
mod shell;

use anyhow::{Context, Result};
use cli::CliArgs;
use shell::Shell;
use std::io;
use writebox_core::{EditorConfig, Workspace};

fn main() -> Result<()> {
    let args = CliArgs::from_env();
    logging::init();

    let config = match &args.config {
        Some(path) => EditorConfig::load_from(path)?,
        None => EditorConfig::default(),
    };
    let options = config.document_options()?;

    shell::start_checker_load();

    let mut workspace = Workspace::new(options);
    if let Some(path) = &args.file {
        workspace
            .open(path, args.encoding)
            .with_context(|| format!("failed to open {}", path.display()))?;
    }
    tracing::info!(documents = workspace.len(), "starting");

    let mut shell = Shell::new(workspace);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    shell.run(stdin.lock(), &mut stdout)?;

    let workspace = shell.workspace();
    let unsaved = workspace
        .ids()
        .iter()
        .filter(|id| workspace.needs_save_prompt(**id).unwrap_or(false))
        .count();
    if unsaved > 0 {
        tracing::warn!(unsaved, "exiting with unsaved changes");
    }
    Ok(())
}
