#![allow(dead_code)] // not every test binary uses every helper

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use sheetgate::config::AppConfig;
use sheetgate::router::{app, AppState};
use sheetgate::store::{MemoryStore, SheetInfo, SheetStore, StoreError};

/// Grid helper: every cell as a raw string, the way sheet stores hand them out.
pub fn grid(rows: &[&[&str]]) -> Vec<Vec<Value>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| Value::String(cell.to_string())).collect())
        .collect()
}

/// The store every integration test starts from: one open sheet, the
/// protected `users` sheet, a sheet with an explicit `_id` column, and the
/// reserved credentials sheet.
pub fn seeded_store() -> MemoryStore {
    MemoryStore::new()
        .with_sheet(
            "things",
            grid(&[
                &["name", "status", "enabled", "_hash"],
                &["alpha", "a", "true", ""],
                &["beta", "b", "true", ""],
                &["gamma", "a", "false", ""],
            ]),
        )
        .with_sheet(
            "tasks",
            grid(&[
                &["_id", "title", "enabled", "_hash"],
                &["1", "write", "true", ""],
                &["2", "review", "true", ""],
            ]),
        )
        .with_sheet(
            "users",
            grid(&[
                &["name", "role", "enabled"],
                &["admin", "owner", "true"],
            ]),
        )
        .with_sheet(
            "apiusers",
            grid(&[
                &["apiUser", "apiKey"],
                &["alice", "s3cret"],
            ]),
        )
}

pub fn test_app() -> Router {
    app_with_store(Arc::new(seeded_store()))
}

pub fn app_with_store(store: Arc<dyn SheetStore>) -> Router {
    let state = AppState::new(AppConfig::development(), store).expect("app state");
    app(Arc::new(state))
}

pub async fn get_response(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    (status, String::from_utf8(bytes.to_vec()).expect("utf8 body"))
}

pub async fn get_json(app: &Router, uri: &str) -> Value {
    let (status, body) = get_response(app, uri).await;
    assert_eq!(status, StatusCode::OK, "unexpected status for {}: {}", uri, status);
    serde_json::from_str(&body).unwrap_or_else(|e| panic!("bad json for {}: {} ({})", uri, body, e))
}

/// Store wrapper recording which sheets get read, for call-count assertions.
pub struct CountingStore {
    inner: MemoryStore,
    pub reads: Mutex<Vec<String>>,
}

impl CountingStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            reads: Mutex::new(Vec::new()),
        }
    }

    pub fn reads_of(&self, sheet: &str) -> usize {
        self.reads
            .lock()
            .expect("reads poisoned")
            .iter()
            .filter(|name| name.as_str() == sheet)
            .count()
    }

    pub fn reset(&self) {
        self.reads.lock().expect("reads poisoned").clear();
    }
}

impl SheetStore for CountingStore {
    fn list_sheets(&self) -> Result<Vec<SheetInfo>, StoreError> {
        self.inner.list_sheets()
    }

    fn read_grid(&self, sheet: &str) -> Result<Vec<Vec<Value>>, StoreError> {
        self.reads
            .lock()
            .expect("reads poisoned")
            .push(sheet.to_string());
        self.inner.read_grid(sheet)
    }

    fn write_row(
        &self,
        sheet: &str,
        row: usize,
        column_count: usize,
        values: &[Value],
    ) -> Result<(), StoreError> {
        self.inner.write_row(sheet, row, column_count, values)
    }
}
