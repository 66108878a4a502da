//! Polymorphic JSON codec.
//!
//! # Data Flow
//! ```text
//! raw JSON region (Box<RawValue>)
//!     → discriminator.rs (read `module` / `handler` only)
//!     → namespace + "." + discriminator → module id
//!     → field.rs (registry lookup, empty instance, full decode)
//!     → collections.rs (app maps keyed by id, ordered handler lists)
//!
//! Encode:
//!     Box<dyn Module> → Module::marshal_json → Box<RawValue>
//! ```
//!
//! # Design Decisions
//! - Decode is fail-fast; errors carry the map key or list index
//! - Encode never consults the registry; the concrete type is known
//! - Absent regions decode to `None` and are omitted on encode

pub mod collections;
pub mod discriminator;
pub mod field;

pub use collections::{decode_apps, decode_handlers, encode_apps, encode_handlers, AppMap, HandlerList};
pub use discriminator::{read_discriminator, resolve};
pub use field::{decode_field, decode_module, encode_field, encode_module};

/// A family of modules selected by a discriminator field inside the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace {
    /// Id prefix, e.g. `caddy.storage`.
    pub prefix: &'static str,

    /// Name of the discriminator field, e.g. `module`.
    pub field: &'static str,
}

impl Namespace {
    pub const fn new(prefix: &'static str, field: &'static str) -> Self {
        Self { prefix, field }
    }

    /// Full module id for a discriminator value.
    pub fn module_id(&self, name: &str) -> String {
        format!("{}.{}", self.prefix, name)
    }
}

/// Storage backends: `{"module": "file_system", ...}` → `caddy.storage.file_system`.
pub const STORAGE: Namespace = Namespace::new("caddy.storage", "module");

/// HTTP handlers: `{"handler": "reverse_proxy", ...}` → `http.handlers.reverse_proxy`.
pub const HTTP_HANDLERS: Namespace = Namespace::new("http.handlers", "handler");
