//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use tokio::net::TcpListener;

/// A request seen by the mock admin server.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[derive(Default)]
struct MockState {
    responses: Mutex<HashMap<(Method, String), (StatusCode, String)>>,
    requests: Mutex<Vec<Recorded>>,
}

/// In-process stand-in for the admin API.
///
/// Every request is recorded. Responses are programmed per method and path;
/// anything unprogrammed answers `200` with an empty body.
#[derive(Clone, Default)]
pub struct MockAdmin {
    state: Arc<MockState>,
}

impl MockAdmin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method path` with `status` and `body`.
    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: &str) {
        self.state
            .responses
            .lock()
            .unwrap()
            .insert((method, path.to_string()), (status, body.to_string()));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("no request recorded")
    }

    fn router(&self) -> Router {
        Router::new().fallback(handle).with_state(self.state.clone())
    }

    /// Serve on an ephemeral TCP port and return the base address.
    pub async fn serve_tcp(&self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = self.router();

        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        format!("http://{}", addr)
    }

    /// Serve on a unix socket inside `dir` and return its path.
    #[cfg(unix)]
    pub async fn serve_unix(&self, dir: &Path) -> PathBuf {
        let path = dir.join("admin.sock");
        let listener = tokio::net::UnixListener::bind(&path).unwrap();
        let router = self.router();

        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        path
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let path = uri.path().to_string();
    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        content_type,
        body,
    });

    state
        .responses
        .lock()
        .unwrap()
        .get(&(method, path))
        .cloned()
        .unwrap_or((StatusCode::OK, String::new()))
}

/// Read a fixture from `tests/testdata`.
pub fn fixture(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/testdata").join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("reading {}: {}", path.display(), e))
}

/// Parse JSON bytes for order-insensitive comparison.
pub fn json(bytes: &[u8]) -> serde_json::Value {
    serde_json::from_slice(bytes).unwrap()
}
