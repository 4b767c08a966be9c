#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays edit scripts against a blank map.

mod config;
mod script;

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    config::EditorConfig,
    script::{Script, ScriptRunner},
};

/// Command-line arguments accepted by the editor.
#[derive(Debug, Parser)]
#[command(name = "mapforge", about = "Replay map edits with full undo history")]
struct Args {
    /// TOML file with `[map]` and `[history]` settings.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// TOML file listing the `[[edit]]` steps to apply.
    #[arg(long, value_name = "PATH")]
    script: Option<PathBuf>,

    /// Print a report of the map and history after the script ran.
    #[arg(long)]
    summary: bool,
}

/// Entry point for the mapforge command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = EditorConfig::load(args.config.as_deref())?;
    let mut runner = ScriptRunner::new(&config);

    if let Some(path) = &args.script {
        let script = Script::load(path)?;
        runner
            .run(&script)
            .with_context(|| format!("failed to replay {}", path.display()))?;
    }

    if args.summary {
        let stdout = io::stdout();
        runner
            .write_summary(&mut stdout.lock())
            .context("failed to write summary")?;
    }
    Ok(())
}
