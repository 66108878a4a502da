//! Collection codecs: app maps and handler lists.
//!
//! # Design Decisions
//! - Apps are keyed by module id directly; there is no discriminator field
//!   inside an app object
//! - `BTreeMap` keeps app keys sorted, so repeated encodes are byte-identical
//! - Handler lists keep in-memory order, which is execution order

use std::collections::BTreeMap;

use serde_json::value::RawValue;

use crate::codec::{discriminator::resolve, field::decode_module, field::encode_module, Namespace};
use crate::error::{ConfigError, ConfigResult};
use crate::module::{Module, ModuleRegistry};

/// Top-level apps keyed by name.
pub type AppMap = BTreeMap<String, Box<dyn Module>>;

/// Ordered chain of handler modules.
pub type HandlerList = Vec<Box<dyn Module>>;

/// Decode every raw app, using each key as the module id.
pub fn decode_apps(
    registry: &ModuleRegistry,
    raw_apps: BTreeMap<String, Box<RawValue>>,
) -> ConfigResult<AppMap> {
    let mut apps = AppMap::new();

    for (name, raw) in raw_apps {
        let app = decode_module(registry, &name, &raw).map_err(|source| ConfigError::App {
            name: name.clone(),
            source: Box::new(source),
        })?;
        apps.insert(name, app);
    }

    Ok(apps)
}

/// Encode every app into a fresh raw map.
pub fn encode_apps(apps: &AppMap) -> ConfigResult<BTreeMap<String, Box<RawValue>>> {
    apps.iter()
        .map(|(name, app)| {
            encode_module(app.as_ref())
                .map(|raw| (name.clone(), raw))
                .map_err(|source| ConfigError::App {
                    name: name.clone(),
                    source: Box::new(source),
                })
        })
        .collect()
}

/// Decode a raw handler chain in order, stopping at the first failure.
pub fn decode_handlers(
    registry: &ModuleRegistry,
    raw_handlers: &[Box<RawValue>],
    namespace: Namespace,
) -> ConfigResult<HandlerList> {
    raw_handlers
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            resolve(registry, raw, namespace).map_err(|source| ConfigError::Handler {
                index,
                source: Box::new(source),
            })
        })
        .collect()
}

/// Encode a handler chain in order.
pub fn encode_handlers(handlers: &[Box<dyn Module>]) -> ConfigResult<Vec<Box<RawValue>>> {
    handlers
        .iter()
        .enumerate()
        .map(|(index, handler)| {
            encode_module(handler.as_ref()).map_err(|source| ConfigError::Handler {
                index,
                source: Box::new(source),
            })
        })
        .collect()
}
