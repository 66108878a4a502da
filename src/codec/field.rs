//! Single polymorphic value codec.

use serde_json::value::RawValue;

use crate::codec::{discriminator::resolve, Namespace};
use crate::error::{ConfigError, ConfigResult};
use crate::module::{scope, Module, ModuleRegistry};

/// Look up `id`, build an empty instance, and decode `raw` into it.
///
/// A typed failure raised by a nested polymorphic field inside the module is
/// returned as is; any other decode error becomes `ConcreteDecode`.
pub fn decode_module(
    registry: &ModuleRegistry,
    id: &str,
    raw: &RawValue,
) -> ConfigResult<Box<dyn Module>> {
    let info = registry.lookup(id)?;
    let mut module = info.instantiate();

    module.unmarshal_json(raw).map_err(|source| {
        scope::take_failure(&source).unwrap_or_else(|| ConfigError::ConcreteDecode {
            id: id.to_string(),
            source,
        })
    })?;

    Ok(module)
}

/// Decode an optional discriminated field. An absent region yields `None`.
pub fn decode_field(
    registry: &ModuleRegistry,
    raw: Option<&RawValue>,
    namespace: Namespace,
) -> ConfigResult<Option<Box<dyn Module>>> {
    raw.map(|raw| resolve(registry, raw, namespace)).transpose()
}

/// Encode a module to raw JSON.
pub fn encode_module(module: &dyn Module) -> ConfigResult<Box<RawValue>> {
    module.marshal_json().map_err(|source| ConfigError::Encode {
        context: module.caddy_module().id,
        source,
    })
}

/// Encode an optional module. `None` stays `None` so the field is omitted.
pub fn encode_field(module: Option<&dyn Module>) -> ConfigResult<Option<Box<RawValue>>> {
    module.map(encode_module).transpose()
}
