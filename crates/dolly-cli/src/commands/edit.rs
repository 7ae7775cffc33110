//! Path editor: opens a path file in the interactive editor window.

use anyhow::Result;
use dolly_editor::DollyConfig;
use std::path::PathBuf;

pub struct EditArgs {
    pub file: PathBuf,
    pub watch: bool,
}

pub fn run(args: EditArgs, config: DollyConfig) -> Result<()> {
    tracing::debug!(?config, "Starting editor");
    dolly_editor::app::run(&args.file, args.watch, config)
}
