#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, Bytes, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use serde_json::Value;
use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

use txirimiri::config::{Config, SessionBackend};
use txirimiri::db::ViewerStorage;
use txirimiri::session::SessionStore;
use txirimiri::{TxirimiriState, txirimiri_router};

pub const TEST_TOKEN: &str = "ck-test-token";

/// Router over a throwaway SQLite file, removed on drop.
pub struct TestApp {
    pub app: Router,
    pub storage: ViewerStorage,
    db_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.db_path);
        for suffix in ["-wal", "-shm"] {
            let mut side = self.db_path.clone().into_os_string();
            side.push(suffix);
            let _ = fs::remove_file(side);
        }
    }
}

pub async fn spawn_app(backend: SessionBackend) -> TestApp {
    spawn_app_with(backend, |_| {}).await
}

/// Like [`spawn_app`], with a hook to adjust the config before the router is built.
pub async fn spawn_app_with(backend: SessionBackend, tweak: impl FnOnce(&mut Config)) -> TestApp {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut db_path = std::env::temp_dir();
    db_path.push(format!(
        "txirimiri-test-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));

    let database_url = format!("sqlite:{}", db_path.display());
    let pool = txirimiri::db::connect(&database_url)
        .await
        .expect("failed to open test database");
    let storage = ViewerStorage::new(pool.clone());
    storage.init_schema().await.expect("failed to init schema");

    let mut cfg = Config::default();
    cfg.cloudkit.api_token = TEST_TOKEN.to_string();
    cfg.basic.static_dir = None;
    cfg.session.backend = backend;
    tweak(&mut cfg);

    let sessions = SessionStore::from_config(&cfg.session, pool)
        .await
        .expect("failed to build session store");
    let state = TxirimiriState::new(storage.clone(), sessions, &cfg);
    let app = txirimiri_router(state, &cfg.basic);

    TestApp {
        app,
        storage,
        db_path,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body was not JSON")
    }

    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.body).expect("response body was not utf-8")
    }

    /// `name=value` part of the session cookie set by this response, if any.
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter(|v| v.starts_with("txirimiri_sessionid="))
            .map(|v| v.split(';').next().unwrap_or_default().to_string())
            .next()
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> TestResponse {
    let resp = app.clone().oneshot(req).await.expect("request failed");
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    post_raw_json(uri, body.to_string())
}

pub fn post_raw_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .expect("failed to build request")
}

pub fn with_cookie(mut req: Request<Body>, cookie: &str) -> Request<Body> {
    req.headers_mut().insert(
        header::COOKIE,
        cookie.parse().expect("invalid cookie header"),
    );
    req
}
