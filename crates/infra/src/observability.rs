//! `tracing-subscriber` bootstrap
//!
//! Installs a global subscriber filtered by `RUST_LOG`. Installation is
//! idempotent: later calls leave the first subscriber in place, so tests and
//! embedding applications can both call it.

use tracing_subscriber::fmt::layer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{registry, EnvFilter};

/// Directives used when `RUST_LOG` is unset or invalid
pub const DEFAULT_LOG_DIRECTIVES: &str = "info,keeper_core=debug";

/// Install the global subscriber with human-readable output
///
/// Returns `true` if this call installed it.
pub fn init_tracing() -> bool {
    init_tracing_with(DEFAULT_LOG_DIRECTIVES, false)
}

/// Install the global subscriber
///
/// `default_directives` apply when `RUST_LOG` is unset or does not parse.
/// With `json` set, events are written as one JSON object per line.
pub fn init_tracing_with(default_directives: &str, json: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    let installed = if json {
        registry().with(filter).with(layer().json()).try_init().is_ok()
    } else {
        registry().with(filter).with(layer()).try_init().is_ok()
    };

    if installed {
        tracing::debug!(json, "tracing subscriber installed");
    }
    installed
}
