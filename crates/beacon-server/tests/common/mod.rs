#![allow(dead_code)]

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use beacon_server::app;
use beacon_server::config::ServerConfig;
use beacon_server::seed;
use beacon_server::state::AppState;
use beacon_storage::{JsonFileStore, NotificationStore};
use chrono::Utc;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub struct TestContext {
    pub temp_dir: TempDir,
    pub data_file: PathBuf,
    pub state: AppState,
    pub app: axum::Router,
}

fn build_with_store(temp_dir: TempDir, data_file: PathBuf, store: JsonFileStore) -> TestContext {
    let config = ServerConfig {
        data_file: data_file.to_string_lossy().to_string(),
        ..ServerConfig::default()
    };
    let state = AppState {
        store: Arc::new(store),
        start_time: Utc::now(),
        config: Arc::new(config),
    };
    let app = app::build_http_app(state.clone());
    TestContext {
        temp_dir,
        data_file,
        state,
        app,
    }
}

/// Empty store backed by `data/db.json` in a fresh temp directory.
pub fn build_test_context() -> Result<TestContext> {
    beacon_common::id::init(1, 1);
    let temp_dir = tempfile::tempdir()?;
    let data_file = temp_dir.path().join("data").join("db.json");
    let store = JsonFileStore::open(&data_file)?;
    Ok(build_with_store(temp_dir, data_file, store))
}

/// Same as [`build_test_context`] with the two default records imported.
pub fn build_seeded_context() -> Result<TestContext> {
    let ctx = build_test_context()?;
    seed::init_default_notifications(ctx.state.store.as_ref())?;
    Ok(ctx)
}

/// Rebuilds the app over the document left behind by `ctx`.
pub fn reopen(ctx: TestContext) -> Result<TestContext> {
    let TestContext {
        temp_dir,
        data_file,
        state,
        app,
    } = ctx;
    drop(app);
    drop(state);
    let store = JsonFileStore::open(&data_file)?;
    Ok(build_with_store(temp_dir, data_file, store))
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value, Option<String>) {
    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");

    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json, trace_id)
}

pub async fn request_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Value,
) -> (StatusCode, Value, Option<String>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build");
    send(app, req).await
}

pub async fn request_raw(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: impl Into<Body>,
) -> (StatusCode, Value, Option<String>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(body.into())
        .expect("request should build");
    send(app, req).await
}

pub async fn request_no_body(
    app: &axum::Router,
    method: &str,
    uri: &str,
) -> (StatusCode, Value, Option<String>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(app, req).await
}

pub fn assert_failure(body: &Value, message: &str) {
    assert_eq!(body["success"], false, "unexpected body: {body}");
    assert_eq!(body["message"], message, "unexpected body: {body}");
}

/// Removes the directory holding the document so every later flush fails.
pub fn break_data_dir(ctx: &TestContext) {
    let dir = ctx.data_file.parent().expect("data file should have a parent");
    std::fs::remove_dir_all(dir).expect("data dir should be removable");
}

pub fn persisted_document(ctx: &TestContext) -> Value {
    let content = std::fs::read_to_string(&ctx.data_file).expect("document should exist");
    serde_json::from_str(&content).expect("document should be valid json")
}
