//! tracing subscriber setup

use anyhow::{Context, Result};
use tracing_subscriber::filter::{Directive, EnvFilter};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`;
/// each `-v` raises the default one step (debug, then trace).
pub fn init(level: &str, verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => level,
        1 => "debug",
        _ => "trace",
    };
    let directive: Directive = level
        .parse()
        .with_context(|| format!("Invalid log level '{}'", level))?;

    let filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    // Logs go to stderr so command output on stdout stays clean
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}
