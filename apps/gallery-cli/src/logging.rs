//! Tracing/logging bootstrap for the CLI.

use std::env;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,gallery_cli=debug,gallery_feed=debug";

/// Install the stderr subscriber; stdout carries only rendered pages.
///
/// The filter comes from `RUST_LOG`, then `GALLERY_CLI_LOG`, then
/// `GALLERY_LOG`, falling back to debug output for the gallery crates.
pub fn init() {
    let env_filter = filter_from_env();
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .try_init();
}

fn filter_from_env() -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    for key in ["GALLERY_CLI_LOG", "GALLERY_LOG"] {
        if let Some(value) = env::var(key).ok().filter(|v| !v.trim().is_empty())
            && let Ok(filter) = EnvFilter::try_new(value)
        {
            return filter;
        }
    }

    EnvFilter::new(DEFAULT_FILTER)
}
