//! Built-in modules.
//!
//! These are ordinary extensions: each implements `CaddyModule` and is added
//! to a registry by [`register_builtins`]. The global registry calls it once
//! on first use.

pub mod http;
pub mod storage;
pub mod tls;

use crate::module::ModuleRegistry;

/// Register every built-in module into `registry`.
pub fn register_builtins(registry: &ModuleRegistry) {
    registry.register_module::<storage::FileStorage>();
    registry.register_module::<http::HttpApp>();
    registry.register_module::<http::ReverseProxy>();
    registry.register_module::<http::StaticResponse>();
    registry.register_module::<http::Subroute>();
    registry.register_module::<tls::Tls>();
}
