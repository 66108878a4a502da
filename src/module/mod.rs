//! Module subsystem.
//!
//! # Data Flow
//! ```text
//! extension type (implements CaddyModule)
//!     → ModuleInfo { id, new }
//!     → registry.rs (id → ModuleInfo, shared, concurrent)
//!
//! During decode:
//!     namespace + discriminator → id
//!     → registry lookup → ModuleInfo::instantiate()
//!     → Module::unmarshal_json(raw bytes)
//! ```
//!
//! # Design Decisions
//! - Polymorphic values are owned `Box<dyn Module>`; no shared ownership
//! - Concrete types implement `CaddyModule`; the object-safe `Module`
//!   surface comes from a blanket impl
//! - Ids are dot separated: everything before the last dot is the
//!   namespace, the last segment is the module name

pub mod registry;
pub(crate) mod scope;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::value::RawValue;

pub use registry::{lookup, register_module, ModuleRegistry};

/// Factory stored in a [`ModuleInfo`]; returns a new, empty instance per call.
pub type ModuleFactory = Arc<dyn Fn() -> Box<dyn Module> + Send + Sync>;

/// Describes a module: its namespaced id and how to build an empty instance.
#[derive(Clone)]
pub struct ModuleInfo {
    /// Unique, namespaced identifier, e.g. `caddy.storage.file_system`.
    pub id: String,

    /// Returns a new, empty instance of the module's type.
    pub new: ModuleFactory,
}

impl ModuleInfo {
    /// Create a descriptor from an id and a factory.
    pub fn new<F>(id: impl Into<String>, new: F) -> Self
    where
        F: Fn() -> Box<dyn Module> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            new: Arc::new(new),
        }
    }

    /// Descriptor for a concrete module type, built from its default value.
    pub fn of<T: CaddyModule>() -> Self {
        Self::new(T::ID, || Box::new(T::default()))
    }

    /// The module name: the last segment of the id.
    pub fn name(&self) -> &str {
        module_name(&self.id)
    }

    /// Everything before the last segment of the id.
    pub fn namespace(&self) -> &str {
        match self.id.rfind('.') {
            Some(i) => &self.id[..i],
            None => "",
        }
    }

    /// Build a fresh, empty instance.
    pub fn instantiate(&self) -> Box<dyn Module> {
        (self.new)()
    }
}

impl fmt::Debug for ModuleInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleInfo").field("id", &self.id).finish()
    }
}

/// Returns the substring after the final `.` of `id`, or `""` if there is none.
pub fn module_name(id: &str) -> &str {
    match id.rfind('.') {
        Some(i) => &id[i + 1..],
        None => "",
    }
}

/// Implemented by every concrete extension type.
///
/// The type's serde representation is its wire format. Its `Default` value is
/// what the registry hands out before decoding into it.
pub trait CaddyModule:
    Serialize + DeserializeOwned + Default + Clone + PartialEq + fmt::Debug + Send + Sync + 'static
{
    /// Namespaced module id.
    const ID: &'static str;
}

/// Object-safe capability shared by all polymorphic values.
pub trait Module: fmt::Debug + Send + Sync + 'static {
    /// Describe this value's module.
    fn caddy_module(&self) -> ModuleInfo;

    /// Replace this value with one decoded from `raw`.
    fn unmarshal_json(&mut self, raw: &RawValue) -> serde_json::Result<()>;

    /// Encode this value to raw JSON.
    fn marshal_json(&self) -> serde_json::Result<Box<RawValue>>;

    fn clone_module(&self) -> Box<dyn Module>;

    fn eq_module(&self, other: &dyn Module) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: CaddyModule> Module for T {
    fn caddy_module(&self) -> ModuleInfo {
        ModuleInfo::of::<T>()
    }

    fn unmarshal_json(&mut self, raw: &RawValue) -> serde_json::Result<()> {
        *self = serde_json::from_str(raw.get())?;
        Ok(())
    }

    fn marshal_json(&self) -> serde_json::Result<Box<RawValue>> {
        serde_json::value::to_raw_value(self)
    }

    fn clone_module(&self) -> Box<dyn Module> {
        Box::new(self.clone())
    }

    fn eq_module(&self, other: &dyn Module) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn Module {
    /// Returns true if the boxed value is a `T`.
    pub fn is<T: Module>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Module>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Module>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

impl Clone for Box<dyn Module> {
    fn clone(&self) -> Self {
        self.clone_module()
    }
}

impl PartialEq for dyn Module {
    fn eq(&self, other: &Self) -> bool {
        self.eq_module(other)
    }
}

// Works around rust-lang/rust#31740 so `Box<dyn Module>` values can be
// compared by value (e.g. in `assert_eq!`) without a spurious move error.
impl PartialEq<&Self> for Box<dyn Module> {
    fn eq(&self, other: &&Self) -> bool {
        self.eq_module(other.as_ref())
    }
}
