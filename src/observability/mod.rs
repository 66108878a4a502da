//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry, codec, client
//!     → tracing events (debug: registration and resolution, warn: failed decodes)
//!     → logging.rs (fmt layer on stderr, EnvFilter)
//! ```

pub mod logging;
