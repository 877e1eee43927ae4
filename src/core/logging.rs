//! core::logging
//!
//! Tracing subscriber setup.
//!
//! `RUST_LOG` is honored when set; otherwise the level is `info`, or `debug`
//! when debug mode is on. Debug mode overrides `RUST_LOG` so `--debug`
//! always produces request logs.

use tracing_subscriber::EnvFilter;

/// Filter used for a given debug setting.
pub fn filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Install the global subscriber, writing to standard output.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(debug: bool) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter(debug))
        .with_target(debug)
        .try_init();
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_forces_debug_level() {
        assert_eq!(filter(true).to_string(), "debug");
    }

    #[test]
    fn init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
