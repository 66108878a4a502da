//! Typed Caddy configuration with registry-driven polymorphic JSON.
//!
//! Polymorphic regions of the document (the storage backend, the apps map,
//! HTTP handler chains) are resolved at decode time. A discriminator in the
//! JSON is combined with a namespace to form a module id, and the id is looked
//! up in a [`ModuleRegistry`].

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod module;
pub mod modules;
pub mod observability;
pub mod settings;

pub use client::AdminClient;
pub use config::{decode, encode, Config};
pub use error::{ConfigError, ConfigResult};
pub use module::{lookup, register_module, CaddyModule, Module, ModuleInfo, ModuleRegistry};
