//! Configuration document.
//!
//! # Data Flow
//! ```text
//! JSON bytes
//!     → RawConfig (structural decode; polymorphic regions kept as RawValue)
//!     → codec (storage via `caddy.storage`, apps by key)
//!     → Config (typed)
//!
//! Config
//!     → codec (modules re-encoded to RawValue)
//!     → RawConfigRef (one structural encode)
//!     → JSON bytes
//! ```
//!
//! # Design Decisions
//! - Raw regions live only in the private staging structs, never on `Config`
//! - Every optional field is omitted when empty
//! - Apps are a `BTreeMap`, so encoding is deterministic

pub mod duration;

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;

use crate::codec::{self, AppMap, STORAGE};
use crate::error::{ConfigError, ConfigResult};
use crate::module::{scope, Module, ModuleRegistry};

pub use duration::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Admin API settings.
    pub admin: Option<AdminConfig>,

    /// Logging settings.
    pub logging: Option<Logging>,

    /// Where assets such as certificates are stored (`caddy.storage.*`).
    pub storage: Option<Box<dyn Module>>,

    /// Top-level apps, keyed by module id.
    pub apps: AppMap,
}

impl Config {
    /// Set the storage module.
    pub fn with_storage(mut self, storage: impl Module) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    /// Add an app under its own module id.
    pub fn with_app(mut self, app: impl Module) -> Self {
        self.apps.insert(app.caddy_module().id, Box::new(app));
        self
    }

    /// Borrow the app named `name` as a concrete type.
    pub fn app<T: Module>(&self, name: &str) -> Option<&T> {
        self.apps.get(name).and_then(|app| app.downcast_ref::<T>())
    }

    /// Borrow the storage module as a concrete type.
    pub fn storage_as<T: Module>(&self) -> Option<&T> {
        self.storage.as_deref().and_then(|storage| storage.downcast_ref::<T>())
    }
}

/// Admin API endpoint configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    #[serde(rename = "@id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Disable the admin endpoint entirely.
    #[serde(skip_serializing_if = "is_false")]
    pub disabled: bool,

    /// Listener address, e.g. `localhost:2019` or `unix//run/caddy.sock`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen: Option<String>,

    /// Require the `Origin` header to match one of `origins`.
    #[serde(skip_serializing_if = "is_false")]
    pub enforce_origin: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub origins: Vec<String>,

    /// Keys not modelled above, kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Logging configuration.
///
/// Only `@id` is modelled; every other key is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    #[serde(rename = "@id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(flatten)]
    pub settings: serde_json::Map<String, serde_json::Value>,
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

/// Structural view of a document: polymorphic regions stay raw.
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    admin: Option<AdminConfig>,
    #[serde(default)]
    logging: Option<Logging>,
    #[serde(default)]
    storage: Option<Box<RawValue>>,
    #[serde(default)]
    apps: Option<BTreeMap<String, Box<RawValue>>>,
}

#[derive(Serialize)]
struct RawConfigRef<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    admin: Option<&'a AdminConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    logging: Option<&'a Logging>,
    #[serde(skip_serializing_if = "Option::is_none")]
    storage: Option<Box<RawValue>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    apps: BTreeMap<String, Box<RawValue>>,
}

impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // A `null` document is an empty configuration.
        let Some(raw) = Option::<RawConfig>::deserialize(deserializer)? else {
            return Ok(Config::default());
        };
        let registry = scope::current();

        let storage = codec::decode_field(&registry, raw.storage.as_deref(), STORAGE)
            .map_err(|err| scope::raise_de::<D::Error>(ConfigError::Storage(Box::new(err))))?;

        let apps = codec::decode_apps(&registry, raw.apps.unwrap_or_default())
            .map_err(scope::raise_de::<D::Error>)?;

        Ok(Config {
            admin: raw.admin,
            logging: raw.logging,
            storage,
            apps,
        })
    }
}

impl Serialize for Config {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let storage = codec::encode_field(self.storage.as_deref())
            .map_err(|err| scope::raise_ser::<S::Error>(ConfigError::Storage(Box::new(err))))?;
        let apps = codec::encode_apps(&self.apps).map_err(scope::raise_ser::<S::Error>)?;

        RawConfigRef {
            admin: self.admin.as_ref(),
            logging: self.logging.as_ref(),
            storage,
            apps,
        }
        .serialize(serializer)
    }
}

/// Decode a document against the global registry.
pub fn decode(buf: &[u8]) -> ConfigResult<Config> {
    ModuleRegistry::global().decode(buf)
}

/// Encode a document to compact JSON.
pub fn encode(config: &Config) -> ConfigResult<Vec<u8>> {
    to_vec(config)
}

/// Encode a document to indented JSON.
///
/// Module bodies are raw JSON, which serde_json writes verbatim, so the
/// compact form is re-parsed before pretty printing.
pub fn encode_pretty(config: &Config) -> ConfigResult<Vec<u8>> {
    let compact = to_vec(config)?;
    let tree: serde_json::Value =
        serde_json::from_slice(&compact).map_err(|source| ConfigError::Encode {
            context: "config".into(),
            source,
        })?;
    serde_json::to_vec_pretty(&tree).map_err(|source| ConfigError::Encode {
        context: "config".into(),
        source,
    })
}

/// Encode any value containing polymorphic fields.
pub fn to_vec<T: Serialize + ?Sized>(value: &T) -> ConfigResult<Vec<u8>> {
    scope::clear_failure();
    serde_json::to_vec(value).map_err(|err| {
        scope::take_failure(&err).unwrap_or(ConfigError::Encode {
            context: "config".into(),
            source: err,
        })
    })
}
