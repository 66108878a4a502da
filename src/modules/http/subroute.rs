//! Subroute handler (`http.handlers.subroute`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::route::deserialize_routes;
use super::{HandlerBase, Route};
use crate::module::CaddyModule;

/// Evaluates a nested list of routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subroute {
    #[serde(flatten)]
    pub base: HandlerBase,

    #[serde(
        default,
        deserialize_with = "deserialize_routes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub routes: Vec<Route>,

    /// Keys not modelled above, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Subroute {
    pub fn new(routes: Vec<Route>) -> Self {
        Self {
            base: HandlerBase::of::<Self>(),
            routes,
            extra: Map::new(),
        }
    }
}

impl Default for Subroute {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl CaddyModule for Subroute {
    const ID: &'static str = "http.handlers.subroute";
}
