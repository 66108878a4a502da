//! Storage modules (`caddy.storage.*`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::module::{module_name, CaddyModule};

/// Fields shared by every storage module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageBase {
    /// Discriminator: the module name within `caddy.storage`.
    pub module: String,
}

impl StorageBase {
    /// Base for the storage module `T`.
    pub fn of<T: CaddyModule>() -> Self {
        Self {
            module: module_name(T::ID).to_string(),
        }
    }
}

/// Local filesystem storage for certificates and other assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStorage {
    #[serde(flatten)]
    pub storage: StorageBase,

    /// Base directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    /// Keys not modelled above, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileStorage {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: Some(root.into()),
            ..Default::default()
        }
    }
}

impl Default for FileStorage {
    fn default() -> Self {
        Self {
            storage: StorageBase::of::<Self>(),
            root: None,
            extra: Map::new(),
        }
    }
}

impl CaddyModule for FileStorage {
    const ID: &'static str = "caddy.storage.file_system";
}
