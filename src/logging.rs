//! Logging initialization for `lf-cli`.
//!
//! Uses `tracing-subscriber` with an `EnvFilter`: `RUST_LOG` wins when
//! set, otherwise verbosity flags pick the level. Log lines go to stderr
//! so stdout stays reserved for command output (run ids, JSON summaries).

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `-v` enables debug, `-vv` trace; `--quiet` restricts to errors.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(verbose: u8, quiet: bool) -> anyhow::Result<()> {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {e}"))?;

    Ok(())
}
