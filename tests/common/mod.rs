//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use link_lookup::config::LookupConfig;
use link_lookup::http::HttpServer;
use link_lookup::lifecycle::bootstrap;
use link_lookup::reload::Reloader;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const SCENARIO_CSV: &str = "Email,Login Link\nA@Example.com,http://x/1\na@example.com,http://x/2\n";

/// A loaded service rooted in its own temp directory.
pub struct TestService {
    pub dir: TempDir,
    pub config: LookupConfig,
    pub reloader: Reloader,
    pub router: Router,
}

impl TestService {
    /// Write `csv` to `<tmp>/data/links.csv` and boot against it.
    pub fn start(csv: &str) -> Self {
        Self::start_with(csv, |_| {})
    }

    pub fn start_with(csv: &str, tweak: impl FnOnce(&mut LookupConfig)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "data/links.csv", csv);

        let mut config = LookupConfig::default();
        config.source.root = dir.path().to_path_buf();
        tweak(&mut config);

        let reloader = bootstrap(&config).expect("initial load");
        let router = HttpServer::new(config.clone(), reloader.clone()).router();
        Self {
            dir,
            config,
            reloader,
            router,
        }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let req = Request::get(uri).body(Body::empty()).unwrap();
        send(self.router.clone(), req).await
    }

    pub async fn post(&self, uri: &str, body: &str, api_key: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::post(uri).header("content-type", "application/json");
        if let Some(key) = api_key {
            builder = builder.header("x-api-key", key);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        send(self.router.clone(), req).await
    }
}

pub fn write_file(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, contents).unwrap();
    path
}

pub async fn send(router: Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = router.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
