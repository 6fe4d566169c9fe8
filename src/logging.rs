//! Process-wide logging setup
//!
//! Library code only emits `tracing` events. The entry point of a training
//! script calls [`init`] once; nothing in this crate installs a subscriber
//! implicitly.

use crate::{Error, Result};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber that prints bare messages.
///
/// The filter is taken from `RUST_LOG` when it is set and parses, otherwise
/// `default_level` applies. Timestamps, levels and targets are omitted so
/// each event prints as its message alone.
///
/// # Errors
///
/// Returns [`Error::Logging`] if a global subscriber is already installed
pub fn init(default_level: Level) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_level(false)
        .with_target(false)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}
