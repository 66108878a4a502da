//! HTTP app (`http`) and its handler modules (`http.handlers.*`).
//!
//! # Structure
//! ```text
//! HttpApp
//!     → servers: name → Server
//!         → routes: [Route]
//!             → match: [MatcherSet]
//!             → handle: [Box<dyn Module>]  (resolved via `http.handlers`)
//! ```

mod reverse_proxy;
mod route;
mod static_response;
mod subroute;

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::config::{is_false, Duration};
use crate::error::ConfigError;
use crate::module::{module_name, scope, CaddyModule};
use route::deserialize_routes;

pub use reverse_proxy::{ActiveHealthCheck, HealthChecks, ReverseProxy, Upstream};
pub use route::Route;
pub use static_response::StaticResponse;
pub use subroute::Subroute;

/// The HTTP server app.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpApp {
    #[serde(rename = "@id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Port for plaintext HTTP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_port: Option<i64>,

    /// Port for HTTPS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https_port: Option<i64>,

    /// How long to wait for active connections when shutting down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace_period: Option<Duration>,

    /// Delay before the grace period starts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shutdown_delay: Option<Duration>,

    #[serde(deserialize_with = "deserialize_servers", skip_serializing_if = "BTreeMap::is_empty")]
    pub servers: BTreeMap<String, Server>,

    /// Keys not modelled above, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CaddyModule for HttpApp {
    const ID: &'static str = "http";
}

/// An HTTP server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    #[serde(rename = "@id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Network addresses to bind, e.g. `:443`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub listen: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_timeout: Option<Duration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_header_timeout: Option<Duration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_timeout: Option<Duration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout: Option<Duration>,

    #[serde(rename = "keepalive_interval", skip_serializing_if = "Option::is_none")]
    pub keep_alive_interval: Option<Duration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_header_bytes: Option<u64>,

    /// Routes evaluated in order.
    #[serde(deserialize_with = "deserialize_routes", skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,

    #[serde(rename = "automatic_https", skip_serializing_if = "Option::is_none")]
    pub auto_https: Option<AutoHttps>,

    /// Keys not modelled above, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Conditions a request must satisfy for a route to apply.
///
/// Only `host` and `path` are modelled; other matchers live in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherSet {
    #[serde(rename = "@id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub host: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Automatic HTTPS settings for a server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoHttps {
    #[serde(rename = "@id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "is_false")]
    pub disable: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields shared by every HTTP handler module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerBase {
    /// Discriminator: the module name within `http.handlers`.
    pub handler: String,
}

impl HandlerBase {
    /// Base for the handler module `T`.
    pub fn of<T: CaddyModule>() -> Self {
        Self {
            handler: module_name(T::ID).to_string(),
        }
    }
}

/// Decode the servers map, tagging a nested failure with the server name.
fn deserialize_servers<'de, D>(deserializer: D) -> Result<BTreeMap<String, Server>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ServersVisitor;

    impl<'de> Visitor<'de> for ServersVisitor {
        type Value = BTreeMap<String, Server>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of server names to servers")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut servers = BTreeMap::new();
            while let Some(name) = map.next_key::<String>()? {
                let server = map.next_value::<Server>().map_err(|err| {
                    scope::rewrap(err, |source| ConfigError::Server {
                        name: name.clone(),
                        source: Box::new(source),
                    })
                })?;
                servers.insert(name, server);
            }
            Ok(servers)
        }
    }

    deserializer.deserialize_map(ServersVisitor)
}
