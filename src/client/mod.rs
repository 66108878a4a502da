//! Admin API client.
//!
//! # Responsibilities
//! - Fetch configuration from a running instance (`/config/...`, `/id/...`)
//! - Push configuration (`/load`, `POST`/`PUT`/`PATCH`/`DELETE` on `/config/...`)
//! - Speak HTTP over TCP (reqwest) or a local unix socket (hyper)
//!
//! # Design Decisions
//! - The client only moves bytes; polymorphic resolution happens in
//!   `decode`/`encode`
//! - Non-2xx responses become `ClientError::Status` carrying the body

#[cfg(unix)]
mod socket;

use std::path::PathBuf;

use axum::body::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::config::{self, Config};
use crate::error::ConfigError;
use crate::module::ModuleRegistry;

/// Default address of the admin API.
pub const DEFAULT_SERVER_ADDR: &str = "http://localhost:2019";

/// Path prefix of the config subtree.
const CONFIG_BASE: &str = "config";

/// Base URL used for requests over a unix socket; only the path matters.
const SOCKET_BASE: &str = "http://127.0.0.1";

/// Errors returned by [`AdminClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid admin address: {0}")]
    Url(#[from] url::ParseError),

    #[error("admin address {0} cannot carry a path")]
    Address(String),

    #[error("sending request: {0}")]
    Http(#[from] reqwest::Error),

    #[error("admin socket: {0}")]
    Socket(#[from] hyper::Error),

    #[error("building request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("reading response body: {0}")]
    Body(#[from] axum::Error),

    #[error("admin socket io: {0}")]
    Io(#[from] std::io::Error),

    #[error("unix sockets are not supported on this platform")]
    UnsupportedSocket,

    #[error("response {status} error: {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone)]
enum Transport {
    Tcp(reqwest::Client),
    Unix(PathBuf),
}

/// Client for the admin API of a running instance.
#[derive(Debug, Clone)]
pub struct AdminClient {
    base: Url,
    transport: Transport,
    registry: ModuleRegistry,
}

impl AdminClient {
    /// Client for the admin API at `address`; an empty address means
    /// [`DEFAULT_SERVER_ADDR`].
    pub fn new(address: &str) -> Result<Self, ClientError> {
        let address = if address.is_empty() {
            DEFAULT_SERVER_ADDR
        } else {
            address
        };

        Ok(Self {
            base: Url::parse(address)?,
            transport: Transport::Tcp(reqwest::Client::new()),
            registry: ModuleRegistry::global().clone(),
        })
    }

    /// Client for an admin API listening on a unix socket.
    pub fn unix(socket_path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        Ok(Self {
            base: Url::parse(SOCKET_BASE)?,
            transport: Transport::Unix(socket_path.into()),
            registry: ModuleRegistry::global().clone(),
        })
    }

    /// Resolve polymorphic fields against `registry` instead of the global one.
    pub fn with_registry(mut self, registry: ModuleRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Export the current configuration.
    pub async fn get_config(&self) -> Result<Config, ClientError> {
        let body = self.send_read(CONFIG_BASE, "").await?;
        Ok(self.registry.decode(&body)?)
    }

    /// Export the configuration at `path`, decoded as `T`.
    pub async fn get_config_by_path<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let body = self.send_read(CONFIG_BASE, path).await?;
        Ok(self.registry.from_slice(&body)?)
    }

    /// Export the configuration object carrying `@id` = `id`, decoded as `T`.
    pub async fn get_config_by_id<T: DeserializeOwned>(&self, id: &str) -> Result<T, ClientError> {
        let body = self.send_read("id", id).await?;
        Ok(self.registry.from_slice(&body)?)
    }

    /// Replace the whole configuration.
    pub async fn load(&self, config: &Config) -> Result<(), ClientError> {
        let url = self.endpoint("load", "")?;
        let body = config::encode(config)?;
        self.send(Method::POST, url, Some(body)).await?;
        tracing::info!(apps = config.apps.len(), "configuration loaded");
        Ok(())
    }

    /// Change the configuration at `path` with POST semantics (append or create).
    pub async fn post_config<T: Serialize + ?Sized>(&self, path: &str, value: &T) -> Result<(), ClientError> {
        self.send_write(Method::POST, path, value).await
    }

    /// Change the configuration at `path` with PUT semantics (insert).
    pub async fn put_config<T: Serialize + ?Sized>(&self, path: &str, value: &T) -> Result<(), ClientError> {
        self.send_write(Method::PUT, path, value).await
    }

    /// Change the configuration at `path` with PATCH semantics (replace).
    pub async fn patch_config<T: Serialize + ?Sized>(&self, path: &str, value: &T) -> Result<(), ClientError> {
        self.send_write(Method::PATCH, path, value).await
    }

    /// Remove the configuration at `path`.
    pub async fn delete_config(&self, path: &str) -> Result<(), ClientError> {
        let url = self.endpoint(CONFIG_BASE, path)?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }

    async fn send_read(&self, base: &str, path: &str) -> Result<Bytes, ClientError> {
        let url = self.endpoint(base, path)?;
        self.send(Method::GET, url, None).await
    }

    async fn send_write<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        value: &T,
    ) -> Result<(), ClientError> {
        let url = self.endpoint(CONFIG_BASE, path)?;
        let body = config::to_vec(value)?;
        self.send(method, url, Some(body)).await?;
        Ok(())
    }

    /// `<base address>/<base>/<path segments>`.
    ///
    /// The config root keeps its trailing slash: the admin API serves
    /// `/config/` and redirects a bare `/config`.
    fn endpoint(&self, base: &str, path: &str) -> Result<Url, ClientError> {
        let segments: Vec<&str> = path.split('/').filter(|segment| !segment.is_empty()).collect();

        let mut url = self.base.clone();
        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|_| ClientError::Address(self.base.to_string()))?;
            parts.pop_if_empty().push(base).extend(segments.iter());
            if segments.is_empty() && base == CONFIG_BASE {
                parts.push("");
            }
        }
        Ok(url)
    }

    async fn send(&self, method: Method, url: Url, body: Option<Vec<u8>>) -> Result<Bytes, ClientError> {
        tracing::debug!(method = %method, url = %url, "admin request");

        let (status, bytes) = match &self.transport {
            Transport::Tcp(client) => {
                let mut request = client.request(method, url).header(CONTENT_TYPE, "application/json");
                if let Some(body) = body {
                    request = request.body(body);
                }
                let response = request.send().await?;
                let status = response.status();
                (status, response.bytes().await?)
            }
            #[cfg(unix)]
            Transport::Unix(path) => socket::send(path, method, &url, body).await?,
            #[cfg(not(unix))]
            Transport::Unix(_) => return Err(ClientError::UnsupportedSocket),
        };

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_segments() {
        let client = AdminClient::new("http://localhost:2019").unwrap();
        assert_eq!(
            client.endpoint("config", "").unwrap().as_str(),
            "http://localhost:2019/config/"
        );
        assert_eq!(
            client.endpoint("config", "/").unwrap().as_str(),
            "http://localhost:2019/config/"
        );
        assert_eq!(
            client.endpoint("config", "apps/http/servers/").unwrap().as_str(),
            "http://localhost:2019/config/apps/http/servers"
        );
        assert_eq!(
            client.endpoint("id", "my_route").unwrap().as_str(),
            "http://localhost:2019/id/my_route"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = AdminClient::new("http://proxy.internal/caddy/").unwrap();
        assert_eq!(
            client.endpoint("load", "").unwrap().as_str(),
            "http://proxy.internal/caddy/load"
        );
    }

    #[test]
    fn test_empty_address_uses_default() {
        let client = AdminClient::new("").unwrap();
        assert_eq!(client.base.as_str(), "http://localhost:2019/");
    }

    #[test]
    fn test_invalid_address() {
        assert!(matches!(AdminClient::new("not a url"), Err(ClientError::Url(_))));
    }
}
