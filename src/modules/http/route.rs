//! HTTP routes.

use std::fmt;

use serde::de::{Error as _, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::{to_raw_value, RawValue};
use serde_json::{Map, Value};

use super::MatcherSet;
use crate::codec::{self, HandlerList, HTTP_HANDLERS};
use crate::error::ConfigError;
use crate::module::{scope, Module};

/// Match conditions plus the handler chain to run when they match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    pub id: Option<String>,

    /// Routes sharing a group are mutually exclusive.
    pub group: Option<String>,

    /// Matcher sets, OR'ed together.
    pub match_sets: Vec<MatcherSet>,

    /// Handlers in execution order.
    pub handle: HandlerList,

    /// Keys not modelled above, kept verbatim.
    pub extra: Map<String, Value>,
}

impl Route {
    /// Append a handler to the chain.
    pub fn with_handler(mut self, handler: impl Module) -> Self {
        self.handle.push(Box::new(handler));
        self
    }

    pub fn with_match(mut self, matcher: MatcherSet) -> Self {
        self.match_sets.push(matcher);
        self
    }
}

/// Structural view of a route.
///
/// Handlers are staged as `Value` rather than `RawValue`: a route may sit
/// inside an extension that uses `#[serde(flatten)]`, where serde buffers the
/// input and raw JSON can no longer be captured.
#[derive(Deserialize)]
struct RawRoute {
    #[serde(rename = "@id", default)]
    id: Option<String>,
    #[serde(default)]
    group: Option<String>,
    #[serde(rename = "match", default)]
    match_sets: Option<Vec<MatcherSet>>,
    #[serde(default)]
    handle: Option<Vec<Value>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Serialize)]
struct RawRouteRef<'a> {
    #[serde(rename = "@id", skip_serializing_if = "Option::is_none")]
    id: Option<&'a String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'a String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    handle: Vec<Box<RawValue>>,
    #[serde(rename = "match", skip_serializing_if = "Vec::is_empty")]
    match_sets: &'a Vec<MatcherSet>,
    #[serde(flatten)]
    extra: &'a Map<String, Value>,
}

impl<'de> Deserialize<'de> for Route {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawRoute::deserialize(deserializer)?;
        let registry = scope::current();

        let raw_handlers = raw
            .handle
            .unwrap_or_default()
            .iter()
            .map(to_raw_value)
            .collect::<Result<Vec<Box<RawValue>>, _>>()
            .map_err(D::Error::custom)?;

        let handle = codec::decode_handlers(&registry, &raw_handlers, HTTP_HANDLERS)
            .map_err(scope::raise_de::<D::Error>)?;

        Ok(Route {
            id: raw.id,
            group: raw.group,
            match_sets: raw.match_sets.unwrap_or_default(),
            handle,
            extra: raw.extra,
        })
    }
}

impl Serialize for Route {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let handle = codec::encode_handlers(&self.handle).map_err(scope::raise_ser::<S::Error>)?;

        RawRouteRef {
            id: self.id.as_ref(),
            group: self.group.as_ref(),
            handle,
            match_sets: &self.match_sets,
            extra: &self.extra,
        }
        .serialize(serializer)
    }
}

/// Decode a route list, tagging a nested failure with its route index.
pub(crate) fn deserialize_routes<'de, D>(deserializer: D) -> Result<Vec<Route>, D::Error>
where
    D: Deserializer<'de>,
{
    struct RoutesVisitor;

    impl<'de> Visitor<'de> for RoutesVisitor {
        type Value = Vec<Route>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a list of routes")
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut routes = Vec::new();
            loop {
                let index = routes.len();
                let next = seq.next_element::<Route>().map_err(|err| {
                    scope::rewrap(err, |source| ConfigError::Route {
                        index,
                        source: Box::new(source),
                    })
                })?;
                match next {
                    Some(route) => routes.push(route),
                    None => return Ok(routes),
                }
            }
        }
    }

    deserializer.deserialize_seq(RoutesVisitor)
}
