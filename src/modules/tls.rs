//! TLS app (`tls`).

use serde::{Deserialize, Serialize};

use crate::module::CaddyModule;

/// TLS facilities: certificate loading and management, client auth, and more.
///
/// Settings are not modelled; they are kept verbatim so they survive a
/// decode/encode cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tls {
    #[serde(flatten)]
    pub settings: serde_json::Map<String, serde_json::Value>,
}

impl CaddyModule for Tls {
    const ID: &'static str = "tls";
}
