//! Process-wide `tracing` initialization: `RUST_LOG`-driven env filtering,
//! a compact human-readable layer by default, or a JSON layer when
//! `SUDOKU_LOG_JSON=1` is set (for piping into log aggregation).

use std::io::IsTerminal;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn use_color() -> bool {
    std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

fn json_output_requested() -> bool {
    std::env::var("SUDOKU_LOG_JSON")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Initialize the global subscriber. Safe to call more than once per
/// process (subsequent calls are no-ops); tests that spawn subprocesses via
/// `assert_cmd` get a fresh subscriber per process automatically.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json_output_requested() {
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(use_color())
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init();
    }
}
