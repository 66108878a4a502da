//! Settings for the `caddyctl` command line tool.
//!
//! # Data Flow
//! ```text
//! caddyctl.toml ─▶ loader.rs ─▶ Settings ─▶ AdminClient
//! config.json   ─▶ watcher.rs ─▶ Config ─▶ AdminClient::load
//! ```

pub mod loader;
pub mod watcher;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::client::{AdminClient, ClientError, DEFAULT_SERVER_ADDR};

pub use loader::{load_settings, SettingsError};
pub use watcher::ConfigWatcher;

/// Tool settings; every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Admin API address.
    pub address: String,

    /// Admin API unix socket; takes precedence over `address`.
    pub socket: Option<PathBuf>,

    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            address: DEFAULT_SERVER_ADDR.to_string(),
            socket: None,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Admin client for these settings.
    pub fn client(&self) -> Result<AdminClient, ClientError> {
        match &self.socket {
            Some(path) => AdminClient::unix(path),
            None => AdminClient::new(&self.address),
        }
    }
}
