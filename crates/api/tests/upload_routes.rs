//! Integration tests for the upload and retrieval routes.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes as BodyBytes},
    http::{Request, StatusCode, header},
};
use bytes::Bytes;
use http_body_util::BodyExt;
use rstest::rstest;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uplink_api::extractors::MULTIPART_OVERHEAD;
use uplink_api::{AppState, create_router};
use uplink_core::storage::LocalDiskStore;
use uplink_core::upload::{EphemeralCache, RemoteStore, RemoteStoreError, UploadOrchestrator};
use uplink_shared::{DeploymentMode, StorageConfig};

const BOUNDARY: &str = "uplink-test-boundary";

/// Remote store that always answers the same way.
struct StubRemote {
    url: Option<&'static str>,
}

#[async_trait]
impl RemoteStore for StubRemote {
    async fn store(
        &self,
        _bytes: Bytes,
        _file_name: &str,
        _content_type: &str,
    ) -> Result<String, RemoteStoreError> {
        self.url
            .map(ToString::to_string)
            .ok_or_else(|| RemoteStoreError::Rejected("service unavailable".to_string()))
    }
}

struct TestApp {
    router: Router,
    dirs: TempDir,
}

fn test_app(mode: DeploymentMode, remote_url: Option<&'static str>, max: usize) -> TestApp {
    let dirs = TempDir::new().expect("temp dir");
    let upload_dir = dirs.path().join("uploads");
    let public_dir = dirs.path().join("public");
    std::fs::create_dir_all(&upload_dir).unwrap();
    std::fs::create_dir_all(&public_dir).unwrap();
    std::fs::write(public_dir.join("index.html"), "<h1>uplink</h1>").unwrap();

    let storage = StorageConfig {
        deployment: mode,
        upload_dir: upload_dir.clone(),
        public_dir,
        max_file_size: max,
    };

    let remote: Arc<dyn RemoteStore> = Arc::new(StubRemote { url: remote_url });
    let cache = Arc::new(EphemeralCache::new());
    let disk = match mode {
        DeploymentMode::Persistent => Some(Arc::new(LocalDiskStore::new(&upload_dir).unwrap())),
        DeploymentMode::Ephemeral => None,
    };
    let orchestrator = UploadOrchestrator::for_mode(mode, remote, disk, Arc::clone(&cache));

    let router = create_router(AppState {
        orchestrator: Arc::new(orchestrator),
        cache,
        storage: Arc::new(storage),
    });

    TestApp { router, dirs }
}

/// One form part: field name, optional file name, content type, data.
type FormPart<'a> = (&'a str, Option<&'a str>, &'a str, &'a [u8]);

fn multipart_form(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, file_name, content_type, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file_name {
            Some(name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{field}\"\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_body(field: &str, file_name: Option<&str>, content_type: &str, data: &[u8]) -> Vec<u8> {
    multipart_form(&[(field, file_name, content_type, data)])
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Option<String>, BodyBytes) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, content_type, body)
}

fn json(body: &[u8]) -> Value {
    serde_json::from_slice(body).expect("json body")
}

#[tokio::test]
async fn test_remote_success_returns_remote_url() {
    let app = test_app(
        DeploymentMode::Persistent,
        Some("https://cdn.example/x"),
        StorageConfig::DEFAULT_MAX_FILE_SIZE,
    );

    let body = multipart_body("file", Some("hello.txt"), "text/plain", b"hello");
    let (status, _, body) = send(&app.router, upload_request(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json(&body),
        serde_json::json!({"success": true, "fileUrl": "https://cdn.example/x"})
    );
    assert_eq!(
        std::fs::read_dir(app.dirs.path().join("uploads"))
            .unwrap()
            .count(),
        0
    );
}

#[tokio::test]
async fn test_persistent_fallback_writes_and_serves_file() {
    let app = test_app(
        DeploymentMode::Persistent,
        None,
        StorageConfig::DEFAULT_MAX_FILE_SIZE,
    );

    let body = multipart_body("file", Some("hello.txt"), "text/plain", b"hello disk");
    let (status, _, body) = send(&app.router, upload_request(body)).await;

    assert_eq!(status, StatusCode::OK);
    let response = json(&body);
    assert_eq!(response["success"], true);
    assert_eq!(response["usedFallback"], true);
    assert_eq!(response["note"], "Using local storage fallback");

    let url = response["fileUrl"].as_str().unwrap();
    let name = url.strip_prefix("/uploads/").expect("local url");
    let (stamp, original) = name.split_once('-').unwrap();
    assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(original, "hello.txt");

    let (status, _, served) = send(&app.router, get(url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&served[..], b"hello disk");
}

#[tokio::test]
async fn test_persistent_fallback_keeps_readable_name() {
    let app = test_app(
        DeploymentMode::Persistent,
        None,
        StorageConfig::DEFAULT_MAX_FILE_SIZE,
    );

    let body = multipart_body("file", Some("my photo (1).png"), "image/png", b"png");
    let (status, _, body) = send(&app.router, upload_request(body)).await;

    assert_eq!(status, StatusCode::OK);
    let url = json(&body)["fileUrl"].as_str().unwrap().to_string();
    let (_, encoded) = url
        .strip_prefix("/uploads/")
        .and_then(|name| name.split_once('-'))
        .expect("timestamped local url");
    assert_eq!(encoded, "my%20photo%20(1).png");

    let (status, _, served) = send(&app.router, get(&url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&served[..], b"png");
}

#[tokio::test]
async fn test_ephemeral_fallback_is_retrievable_twice() {
    let app = test_app(
        DeploymentMode::Ephemeral,
        None,
        StorageConfig::DEFAULT_MAX_FILE_SIZE,
    );

    let payload = [0_u8, 1, 2, 254, 255];
    let body = multipart_body("file", Some("blob.bin"), "image/png", &payload);
    let (status, _, body) = send(&app.router, upload_request(body)).await;

    assert_eq!(status, StatusCode::OK);
    let response = json(&body);
    assert_eq!(response["usedFallback"], true);
    assert_eq!(response["isDataUrl"], true);
    assert!(response.get("note").is_none());

    let url = response["fileUrl"].as_str().unwrap().to_string();
    assert!(url.starts_with("/special-data-url/"));
    assert!(url.ends_with("/blob.bin"));

    for _ in 0..2 {
        let (status, content_type, served) = send(&app.router, get(&url)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("image/png"));
        assert_eq!(&served[..], &payload);
    }
}

#[tokio::test]
async fn test_ephemeral_mode_writes_nothing_to_disk() {
    let app = test_app(
        DeploymentMode::Ephemeral,
        None,
        StorageConfig::DEFAULT_MAX_FILE_SIZE,
    );

    let body = multipart_body("file", Some("a.txt"), "text/plain", b"a");
    let (status, _, _) = send(&app.router, upload_request(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        std::fs::read_dir(app.dirs.path().join("uploads"))
            .unwrap()
            .count(),
        0
    );
}

#[rstest]
#[case::other_field(multipart_body("note", None, "text/plain", b"hi"))]
#[case::file_field_without_name(multipart_body("file", None, "text/plain", b"hi"))]
#[tokio::test]
async fn test_missing_file_is_bad_request(#[case] body: Vec<u8>) {
    let app = test_app(
        DeploymentMode::Persistent,
        Some("https://cdn.example/x"),
        StorageConfig::DEFAULT_MAX_FILE_SIZE,
    );

    let (status, _, body) = send(&app.router, upload_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json(&body),
        serde_json::json!({"success": false, "error": "No file uploaded"})
    );
}

#[tokio::test]
async fn test_non_multipart_request_is_bad_request() {
    let app = test_app(
        DeploymentMode::Persistent,
        Some("https://cdn.example/x"),
        StorageConfig::DEFAULT_MAX_FILE_SIZE,
    );

    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, _, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["error"], "No file uploaded");
}

#[tokio::test]
async fn test_oversized_file_is_rejected() {
    let app = test_app(DeploymentMode::Persistent, Some("https://cdn.example/x"), 16);

    let body = multipart_body("file", Some("big.bin"), "application/octet-stream", &[7; 64]);
    let (status, _, body) = send(&app.router, upload_request(body)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let response = json(&body);
    assert_eq!(response["success"], false);
    assert!(
        response["error"]
            .as_str()
            .unwrap()
            .starts_with("File too large")
    );
}

#[tokio::test]
async fn test_large_form_field_hits_body_limit() {
    let max = 16;
    let padding = vec![b'x'; max + MULTIPART_OVERHEAD + 1];
    let body = multipart_form(&[
        ("comment", None, "text/plain", padding.as_slice()),
        ("file", Some("small.txt"), "text/plain", &b"ok"[..]),
    ]);
    let app = test_app(DeploymentMode::Persistent, Some("https://cdn.example/x"), max);

    let (status, _, body) = send(&app.router, upload_request(body)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        json(&body),
        serde_json::json!({"success": false, "error": "Request body too large"})
    );
}

#[tokio::test]
async fn test_body_over_limit_is_payload_too_large() {
    let max = 16;
    let data = vec![7_u8; max + MULTIPART_OVERHEAD + 1];
    let body = multipart_body("file", Some("huge.bin"), "application/octet-stream", &data);
    let app = test_app(DeploymentMode::Persistent, Some("https://cdn.example/x"), max);

    let (status, _, body) = send(&app.router, upload_request(body)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let response = json(&body);
    assert_eq!(response["success"], false);
    assert!(response["error"].as_str().unwrap().contains("too large"));
}

#[tokio::test]
async fn test_unknown_ephemeral_key_is_not_found() {
    let app = test_app(
        DeploymentMode::Ephemeral,
        None,
        StorageConfig::DEFAULT_MAX_FILE_SIZE,
    );

    let (status, content_type, body) =
        send(&app.router, get("/special-data-url/0-missing/a.txt")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
    assert_eq!(&body[..], b"File not found or expired");
}

#[tokio::test]
async fn test_health_reports_backend_chain() {
    let app = test_app(
        DeploymentMode::Ephemeral,
        None,
        StorageConfig::DEFAULT_MAX_FILE_SIZE,
    );

    let (status, _, body) = send(&app.router, get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    let response = json(&body);
    assert_eq!(response["status"], "healthy");
    assert_eq!(response["deployment"], "ephemeral");
    assert_eq!(
        response["backends"],
        serde_json::json!(["remote_store", "ephemeral_memory"])
    );
}

#[tokio::test]
async fn test_unknown_path_falls_back_to_index() {
    let app = test_app(
        DeploymentMode::Persistent,
        None,
        StorageConfig::DEFAULT_MAX_FILE_SIZE,
    );

    let (status, _, body) = send(&app.router, get("/some/client/route")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"<h1>uplink</h1>");
}
