//! Static response handler (`http.handlers.static_response`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::HandlerBase;
use crate::config::is_false;
use crate::module::CaddyModule;

/// Writes a fixed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticResponse {
    #[serde(flatten)]
    pub base: HandlerBase,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Close the client connection after responding.
    #[serde(default, skip_serializing_if = "is_false")]
    pub close: bool,

    /// Keys not modelled above, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StaticResponse {
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Default::default()
        }
    }
}

impl Default for StaticResponse {
    fn default() -> Self {
        Self {
            base: HandlerBase::of::<Self>(),
            status_code: None,
            headers: BTreeMap::new(),
            body: None,
            close: false,
            extra: Map::new(),
        }
    }
}

impl CaddyModule for StaticResponse {
    const ID: &'static str = "http.handlers.static_response";
}
