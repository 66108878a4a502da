//! Reverse proxy handler (`http.handlers.reverse_proxy`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::HandlerBase;
use crate::config::Duration;
use crate::module::CaddyModule;

/// Proxies requests to one or more upstreams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverseProxy {
    #[serde(flatten)]
    pub base: HandlerBase,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub upstreams: Vec<Upstream>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_checks: Option<HealthChecks>,

    /// CIDR ranges whose forwarding headers are trusted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trusted_proxies: Vec<String>,

    /// Keys not modelled above, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReverseProxy {
    pub fn new(upstreams: Vec<Upstream>) -> Self {
        Self {
            upstreams,
            ..Default::default()
        }
    }
}

impl Default for ReverseProxy {
    fn default() -> Self {
        Self {
            base: HandlerBase::of::<Self>(),
            upstreams: Vec::new(),
            health_checks: None,
            trusted_proxies: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl CaddyModule for ReverseProxy {
    const ID: &'static str = "http.handlers.reverse_proxy";
}

/// A backend to proxy to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Upstream {
    /// Network address to dial, e.g. `localhost:8080`.
    pub dial: String,

    /// Maximum simultaneous requests; unset means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_requests: Option<u32>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Upstream {
    pub fn new(dial: impl Into<String>) -> Self {
        Self {
            dial: dial.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthChecks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<ActiveHealthCheck>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Periodic probing of upstreams.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveHealthCheck {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<Duration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_durations_accept_strings() {
        let input = r#"{"handler":"reverse_proxy","upstreams":[{"dial":"a:80","max_requests":10}],"health_checks":{"active":{"uri":"/health","interval":"30s","timeout":"5s"}}}"#;
        let proxy: ReverseProxy = serde_json::from_str(input).unwrap();

        let active = proxy.health_checks.as_ref().and_then(|h| h.active.as_ref()).unwrap();
        assert_eq!(active.interval, Some(Duration::from_secs(30)));
        assert_eq!(active.timeout, Some(Duration::from_secs(5)));
        assert_eq!(proxy.upstreams[0].max_requests, Some(10));

        let encoded = serde_json::to_string(&proxy).unwrap();
        assert!(encoded.contains(r#""interval":30000000000"#));
    }

    #[test]
    fn test_unmodelled_keys_survive() {
        let input = r#"{"handler":"reverse_proxy","upstreams":[{"dial":"a:80","lookup_srv":"x"}],"headers":{"request":{"set":{"X-Env":["prod"]}}},"transport":{"protocol":"http"}}"#;
        let proxy: ReverseProxy = serde_json::from_str(input).unwrap();

        assert!(!proxy.extra.contains_key("handler"));
        assert!(proxy.extra.contains_key("headers"));
        assert_eq!(proxy.upstreams[0].extra["lookup_srv"], "x");
        assert_eq!(serde_json::to_string(&proxy).unwrap(), input);
    }

    #[test]
    fn test_new_sets_discriminator() {
        let proxy = ReverseProxy::new(vec![Upstream::new("localhost:8080")]);
        assert_eq!(
            serde_json::to_string(&proxy).unwrap(),
            r#"{"handler":"reverse_proxy","upstreams":[{"dial":"localhost:8080"}]}"#
        );
    }
}
