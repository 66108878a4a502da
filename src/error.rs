//! Error types for configuration decoding and encoding.

use thiserror::Error;

/// Errors produced while resolving, decoding, or encoding a configuration.
///
/// Context variants (`Storage`, `App`, `Server`, `Route`, `Handler`) wrap the failure that
/// happened beneath them; [`ConfigError::root_cause`] unwraps the chain.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No module is registered under the requested id.
    #[error("module not found: {id}")]
    ModuleNotFound { id: String },

    /// The raw object has no usable discriminator field.
    #[error("reading `{field}` discriminator for {namespace}: {reason}")]
    Discriminator {
        namespace: String,
        field: &'static str,
        reason: String,
    },

    /// The resolved module type rejected the raw object.
    #[error("decoding module {id}: {source}")]
    ConcreteDecode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// The enclosing document or route did not have the expected shape.
    #[error("decoding config: {0}")]
    Structural(#[source] serde_json::Error),

    /// Failure inside the storage slot.
    #[error("storage: {0}")]
    Storage(#[source] Box<ConfigError>),

    /// Failure inside the app registered under `name`.
    #[error("app {name:?}: {source}")]
    App {
        name: String,
        #[source]
        source: Box<ConfigError>,
    },

    /// Failure inside the HTTP server registered under `name`.
    #[error("servers.{name}: {source}")]
    Server {
        name: String,
        #[source]
        source: Box<ConfigError>,
    },

    /// Failure at position `index` of a route list.
    #[error("routes[{index}]: {source}")]
    Route {
        index: usize,
        #[source]
        source: Box<ConfigError>,
    },

    /// Failure at position `index` of a handler chain.
    #[error("handle[{index}]: {source}")]
    Handler {
        index: usize,
        #[source]
        source: Box<ConfigError>,
    },

    /// Serialization failed.
    #[error("encoding {context}: {source}")]
    Encode {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// Follow context wrappers down to the failure that started the chain.
    pub fn root_cause(&self) -> &ConfigError {
        match self {
            ConfigError::Storage(source)
            | ConfigError::App { source, .. }
            | ConfigError::Server { source, .. }
            | ConfigError::Route { source, .. }
            | ConfigError::Handler { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// The module id involved in the root failure, if there is one.
    pub fn module_id(&self) -> Option<&str> {
        match self.root_cause() {
            ConfigError::ModuleNotFound { id } | ConfigError::ConcreteDecode { id, .. } => {
                Some(id)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_cause_unwraps_context() {
        let err = ConfigError::App {
            name: "http".into(),
            source: Box::new(ConfigError::Server {
                name: "srv0".into(),
                source: Box::new(ConfigError::Route {
                    index: 2,
                    source: Box::new(ConfigError::Handler {
                        index: 1,
                        source: Box::new(ConfigError::ModuleNotFound {
                            id: "http.handlers.nope".into(),
                        }),
                    }),
                }),
            }),
        };

        assert!(matches!(err.root_cause(), ConfigError::ModuleNotFound { .. }));
        assert_eq!(err.module_id(), Some("http.handlers.nope"));
        assert_eq!(
            err.to_string(),
            "app \"http\": servers.srv0: routes[2]: handle[1]: module not found: http.handlers.nope"
        );
    }
}
