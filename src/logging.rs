//! Tracing setup for the CLI.

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Maps the `-v` count to a level for the `taskfi` target.
#[must_use]
pub fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `-v`.
///
/// Logs go to stderr so JSON output on stdout stays parseable.
///
/// # Errors
/// Returns error if a filter directive is invalid or a subscriber is already set.
pub fn init(verbose: u8) -> Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) => EnvFilter::try_new(directives)?,
        Err(_) => EnvFilter::new(format!("taskfi={}", level_for(verbose))),
    };

    let layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(verbose > 1)
        .with_line_number(verbose > 2);

    tracing_subscriber::registry().with(filter).with(layer).try_init()?;
    Ok(())
}
