//! Admin client against an in-process mock admin API.

mod common;

use axum::http::{Method, StatusCode};
use common::{fixture, json, MockAdmin};
use serde_json::Value;

use caddy_config::client::ClientError;
use caddy_config::modules::http::{HttpApp, Route, StaticResponse};
use caddy_config::modules::storage::FileStorage;
use caddy_config::{AdminClient, Config, ConfigError};

#[tokio::test]
async fn test_get_config_decodes_modules() {
    let admin = MockAdmin::new();
    let document = String::from_utf8(fixture("http.json")).unwrap();
    admin.respond(Method::GET, "/config/", StatusCode::OK, &document);
    let client = AdminClient::new(&admin.serve_tcp().await).unwrap();

    let config = client.get_config().await.unwrap();

    assert_eq!(
        config.storage_as::<FileStorage>().unwrap().root.as_deref(),
        Some("/var/lib/caddy")
    );
    assert!(config.app::<HttpApp>("http").is_some());

    let request = admin.last_request();
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.path, "/config/");
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn test_unconfigured_instance_returns_empty_config() {
    let admin = MockAdmin::new();
    admin.respond(Method::GET, "/config/", StatusCode::OK, "null\n");
    let client = AdminClient::new(&admin.serve_tcp().await).unwrap();

    assert_eq!(client.get_config().await.unwrap(), Config::default());
}

#[tokio::test]
async fn test_write_to_config_root_keeps_trailing_slash() {
    let admin = MockAdmin::new();
    let client = AdminClient::new(&admin.serve_tcp().await).unwrap();

    client.post_config("", &Config::default()).await.unwrap();

    let request = admin.last_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/config/");
    assert_eq!(&request.body[..], b"{}");
}

#[tokio::test]
async fn test_get_config_by_path() {
    let admin = MockAdmin::new();
    admin.respond(
        Method::GET,
        "/config/apps/http/servers/srv0/routes/0",
        StatusCode::OK,
        r#"{"handle":[{"handler":"static_response","body":"hi"}]}"#,
    );
    let client = AdminClient::new(&admin.serve_tcp().await).unwrap();

    let route: Route = client
        .get_config_by_path("apps/http/servers/srv0/routes/0")
        .await
        .unwrap();

    let handler = route.handle[0].downcast_ref::<StaticResponse>().unwrap();
    assert_eq!(handler.body.as_deref(), Some("hi"));
}

#[tokio::test]
async fn test_get_config_by_id() {
    let admin = MockAdmin::new();
    admin.respond(Method::GET, "/id/api", StatusCode::OK, r#"{"@id":"api"}"#);
    let client = AdminClient::new(&admin.serve_tcp().await).unwrap();

    let value: Value = client.get_config_by_id("api").await.unwrap();
    assert_eq!(value["@id"], "api");
    assert_eq!(admin.last_request().path, "/id/api");
}

#[tokio::test]
async fn test_load_posts_encoded_document() {
    let admin = MockAdmin::new();
    let client = AdminClient::new(&admin.serve_tcp().await).unwrap();
    let config = Config::default().with_storage(FileStorage::new("/srv"));

    client.load(&config).await.unwrap();

    let request = admin.last_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/load");
    assert_eq!(
        &request.body[..],
        br#"{"storage":{"module":"file_system","root":"/srv"}}"#
    );
}

#[tokio::test]
async fn test_write_methods_target_config_path() {
    let admin = MockAdmin::new();
    let client = AdminClient::new(&admin.serve_tcp().await).unwrap();
    let route = Route::default().with_handler(StaticResponse::with_body("ok"));

    client.post_config("apps/http/servers/srv0/routes", &route).await.unwrap();
    client.put_config("apps/http/servers/srv0/listen/0", &":8443").await.unwrap();
    client.patch_config("apps/http/http_port", &8080).await.unwrap();
    client.delete_config("apps/tls").await.unwrap();

    let requests = admin.requests();
    let seen: Vec<(Method, &str)> = requests
        .iter()
        .map(|r| (r.method.clone(), r.path.as_str()))
        .collect();
    assert_eq!(
        seen,
        vec![
            (Method::POST, "/config/apps/http/servers/srv0/routes"),
            (Method::PUT, "/config/apps/http/servers/srv0/listen/0"),
            (Method::PATCH, "/config/apps/http/http_port"),
            (Method::DELETE, "/config/apps/tls"),
        ]
    );
    assert_eq!(
        json(&requests[0].body),
        serde_json::json!({"handle":[{"handler":"static_response","body":"ok"}]})
    );
    assert_eq!(&requests[2].body[..], b"8080");
}

#[tokio::test]
async fn test_error_status_carries_body() {
    let admin = MockAdmin::new();
    admin.respond(
        Method::POST,
        "/load",
        StatusCode::BAD_REQUEST,
        r#"{"error":"loading config: unknown module"}"#,
    );
    let client = AdminClient::new(&admin.serve_tcp().await).unwrap();

    let err = client.load(&Config::default()).await.unwrap_err();
    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("unknown module"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_module_in_response() {
    let admin = MockAdmin::new();
    admin.respond(Method::GET, "/config/", StatusCode::OK, r#"{"apps":{"pki":{}}}"#);
    let client = AdminClient::new(&admin.serve_tcp().await).unwrap();

    let err = client.get_config().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Config(ref e) if matches!(e.root_cause(), ConfigError::ModuleNotFound { id } if id == "pki")
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn test_unix_socket_transport() {
    let dir = tempfile::tempdir().unwrap();
    let admin = MockAdmin::new();
    admin.respond(Method::GET, "/config/", StatusCode::OK, r#"{"apps":{"http":{"http_port":80}}}"#);
    let socket = admin.serve_unix(dir.path()).await;
    let client = AdminClient::unix(socket.clone()).unwrap();

    let config = client.get_config().await.unwrap();
    assert_eq!(config.app::<HttpApp>("http").unwrap().http_port, Some(80));
    assert_eq!(admin.last_request().path, "/config/");

    client.delete_config("apps/http").await.unwrap();
    let request = admin.last_request();
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(request.path, "/config/apps/http");
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
}
