//! Process-wide tracing subscriber setup for kernel binaries.

#![warn(missing_docs, clippy::pedantic)]

use tracing_subscriber::EnvFilter;

/// Initializes a `tracing-subscriber` `fmt` layer reading its filter from
/// `RUST_LOG`, defaulting to `info` when unset.
///
/// Call once, near the start of `main`. Calling it a second time in the same
/// process is a no-op past the first call (the underlying global subscriber
/// can only be set once); this function ignores that error rather than
/// panicking, since test binaries often call it from multiple test threads.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}
