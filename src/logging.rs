//! Log subscriber setup for the binary.
//!
//! Library code only emits `tracing` events. Guardrail decisions use the
//! `mathcoach::audit` target so they can be filtered apart from the rest.

use std::str::FromStr;
use tracing::Level;

/// Target of redirect, leak, and formula-dump events
pub const AUDIT_TARGET: &str = "mathcoach::audit";

/// Parse a configured level name, falling back to `warn`
pub fn parse_level(name: &str) -> Level {
    Level::from_str(name.trim()).unwrap_or(Level::WARN)
}

/// Level used by the CLI: `--verbose` wins over the configured level
pub fn effective_level(configured: &str, verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else {
        parse_level(configured)
    }
}

/// Install the fmt subscriber on stderr. Safe to call more than once; later
/// calls are ignored.
pub fn init(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
