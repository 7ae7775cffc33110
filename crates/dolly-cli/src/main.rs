//! Dolly CLI - create, inspect and edit keyframed camera paths

mod commands;
mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{edit, path};
use dolly_editor::DollyConfig;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dolly")]
#[command(about = "Keyframe editor for camera paths", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Path file operations
    #[command(subcommand)]
    Path(path::PathCommands),

    /// Open a path file in the interactive editor
    Edit {
        /// Path file (created on first save if missing)
        file: PathBuf,

        /// Reload the path when the file changes on disk
        #[arg(long)]
        watch: bool,

        /// Use this config file instead of the layered global/project config
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn parse_vec3(s: &str) -> Result<[f32; 3], String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("expected 3 comma-separated values, got {}", parts.len()));
    }
    let x: f32 = parts[0].trim().parse().map_err(|e| format!("invalid x: {}", e))?;
    let y: f32 = parts[1].trim().parse().map_err(|e| format!("invalid y: {}", e))?;
    let z: f32 = parts[2].trim().parse().map_err(|e| format!("invalid z: {}", e))?;
    Ok([x, y, z])
}

fn load_config(file: Option<&Path>) -> Result<DollyConfig> {
    match file {
        Some(file) => DollyConfig::load_from_file(file)
            .with_context(|| format!("Failed to load config {}", file.display())),
        None => DollyConfig::load().context("Failed to load config"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_file = match &cli.command {
        Commands::Edit { config, .. } => config.clone(),
        _ => None,
    };
    let config = load_config(config_file.as_deref())?;
    logging::init(&config.log.level, cli.verbose)?;

    match cli.command {
        Commands::Path(cmd) => path::run(cmd),
        Commands::Edit { file, watch, .. } => edit::run(edit::EditArgs { file, watch }, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_vec3_accepts_spaces() {
        assert_eq!(parse_vec3("1, 2.5 ,-3").unwrap(), [1.0, 2.5, -3.0]);
    }

    #[test]
    fn parse_vec3_rejects_wrong_arity() {
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec3("1,2,z").is_err());
    }

    #[test]
    fn add_frame_arguments_parse() {
        let cli = Cli::try_parse_from([
            "dolly",
            "-v",
            "path",
            "add-frame",
            "shot.path.toml",
            "--time",
            "1.5",
            "--position",
            "0,2,10",
            "--target",
            "0,0,0",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Path(path::PathCommands::AddFrame {
                time, position, up, ..
            }) => {
                assert_eq!(time, 1.5);
                assert_eq!(position, [0.0, 2.0, 10.0]);
                assert_eq!(up, [0.0, 1.0, 0.0]);
            }
            _ => panic!("expected path add-frame"),
        }
    }
}
