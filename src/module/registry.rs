//! Module registry.
//!
//! # Responsibilities
//! - Map namespaced ids to module descriptors
//! - Hand out descriptor copies on lookup
//! - Provide the entry points that decode against a specific registry
//!
//! # Design Decisions
//! - `ModuleRegistry` is a cheap, cloneable handle over `Arc<DashMap>`;
//!   clones share the same map
//! - Registration is insert-or-replace: the last registration for an id wins
//! - The process-wide instance is created on first use, pre-populated with
//!   the built-in modules, and lives for the whole process

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{ConfigError, ConfigResult};
use crate::module::{scope, CaddyModule, ModuleInfo};

/// A thread-safe map of module id → [`ModuleInfo`].
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: Arc<DashMap<String, ModuleInfo>>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an isolated registry holding the built-in modules.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        crate::modules::register_builtins(&registry);
        registry
    }

    /// The process-wide registry.
    ///
    /// Initialised once with the built-in modules. Safe to read and register
    /// into from any thread.
    pub fn global() -> &'static ModuleRegistry {
        static GLOBAL: OnceLock<ModuleRegistry> = OnceLock::new();
        GLOBAL.get_or_init(ModuleRegistry::with_builtins)
    }

    /// Add a module, replacing any previous module with the same id.
    pub fn register(&self, info: ModuleInfo) {
        tracing::debug!(id = %info.id, "registering module");
        self.modules.insert(info.id.clone(), info);
    }

    /// Register a concrete module type.
    pub fn register_module<T: CaddyModule>(&self) {
        self.register(ModuleInfo::of::<T>());
    }

    /// Returns the descriptor for `id`.
    pub fn lookup(&self, id: &str) -> ConfigResult<ModuleInfo> {
        self.modules
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ConfigError::ModuleNotFound { id: id.to_string() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.modules.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// All registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.modules.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Run `f` with this registry as the one polymorphic fields resolve against.
    ///
    /// Scopes nest per thread; the previous registry is restored when `f`
    /// returns. Outside any scope the global registry is used.
    pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        let _scope = scope::enter(self);
        f()
    }

    /// Decode a configuration document against this registry.
    pub fn decode(&self, buf: &[u8]) -> ConfigResult<Config> {
        self.from_slice(buf)
    }

    /// Decode any value whose polymorphic fields resolve against this registry.
    pub fn from_slice<T: DeserializeOwned>(&self, buf: &[u8]) -> ConfigResult<T> {
        let _scope = scope::enter(self);
        scope::clear_failure();

        serde_json::from_slice(buf).map_err(|err| {
            let err = scope::take_failure(&err).unwrap_or(ConfigError::Structural(err));
            tracing::warn!(error = %err, "decode failed");
            err
        })
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.ids())
            .finish()
    }
}

/// Register a module type in the global registry.
pub fn register_module<T: CaddyModule>() {
    ModuleRegistry::global().register_module::<T>();
}

/// Look up a module in the global registry.
pub fn lookup(id: &str) -> ConfigResult<ModuleInfo> {
    ModuleRegistry::global().lookup(id)
}
