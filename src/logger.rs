use std::io;

use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// Log to stderr, stdout is kept for the pstate listing
pub fn init_logging() {
    let level = if cfg!(debug_assertions) { "debug" } else { "info" };

    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(f) => (f, true),
        Err(_) => (EnvFilter::new(level), false),
    };

    let fmt_layer = fmt::layer().with_writer(io::stderr).with_target(false);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .init();

    if !from_env {
        debug!("\"RUST_LOG\" variable not set, defaulting to {level}");
    }
}
