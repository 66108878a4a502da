//! Discriminator resolution.

use std::fmt;

use serde::de::{DeserializeSeed, IgnoredAny, MapAccess, Visitor};
use serde::Deserializer;
use serde_json::value::RawValue;

use crate::codec::{field::decode_module, Namespace};
use crate::error::{ConfigError, ConfigResult};
use crate::module::{Module, ModuleRegistry};

/// Reads a single string field from a JSON object, skipping every other key.
struct DiscriminatorSeed {
    field: &'static str,
}

impl<'de> DeserializeSeed<'de> for DiscriminatorSeed {
    type Value = Option<String>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for DiscriminatorSeed {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a JSON object with a `{}` field", self.field)
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut found = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == self.field {
                found = Some(map.next_value::<String>()?);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(found)
    }
}

/// Read the discriminator value of `namespace` from a raw JSON object.
pub fn read_discriminator(raw: &RawValue, namespace: Namespace) -> ConfigResult<String> {
    let discriminator_error = |reason: String| ConfigError::Discriminator {
        namespace: namespace.prefix.to_string(),
        field: namespace.field,
        reason,
    };

    let mut de = serde_json::Deserializer::from_str(raw.get());
    let value = DiscriminatorSeed {
        field: namespace.field,
    }
    .deserialize(&mut de)
    .map_err(|err| discriminator_error(err.to_string()))?;

    match value {
        Some(name) if !name.is_empty() => Ok(name),
        Some(_) => Err(discriminator_error("value is empty".into())),
        None => Err(discriminator_error("field is missing".into())),
    }
}

/// Resolve and decode a raw object whose concrete type is named by its discriminator.
pub fn resolve(
    registry: &ModuleRegistry,
    raw: &RawValue,
    namespace: Namespace,
) -> ConfigResult<Box<dyn Module>> {
    let name = read_discriminator(raw, namespace)?;
    let id = namespace.module_id(&name);
    tracing::trace!(id = %id, "resolved discriminator");
    decode_module(registry, &id, raw)
}
