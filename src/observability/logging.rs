//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for the command line tool
//! - Let `RUST_LOG` override the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive enabling `level` for this crate and its binary.
pub fn default_directive(level: &str) -> String {
    format!("caddy_config={level},caddyctl={level}")
}

/// Install the global subscriber. Logs go to stderr so stdout stays JSON.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive(level).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_parses() {
        let directive = default_directive("debug");
        assert_eq!(directive, "caddy_config=debug,caddyctl=debug");
        assert!(EnvFilter::try_new(&directive).is_ok());
    }

    #[test]
    fn test_init_twice() {
        init("warn");
        init("warn");
    }
}
