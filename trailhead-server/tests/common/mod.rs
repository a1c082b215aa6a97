#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use trailhead_server::{connect_pool, routes, run_migrations, sqlite_url_for_path, AppState};

/// Router su un database SQLite temporaneo. Il TempDir va tenuto in vita.
pub async fn test_app() -> anyhow::Result<(TempDir, Router)> {
    let td = TempDir::new()?;
    let url = sqlite_url_for_path(&td.path().join("trailhead.db"))?;
    let pool = connect_pool(&url).await?;
    run_migrations(&pool).await?;
    Ok((td, routes::router(Arc::new(AppState { pool }))))
}

pub struct Reply {
    pub status: StatusCode,
    pub text: String,
}

impl Reply {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).expect("json body")
    }
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> anyhow::Result<Reply> {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))?,
        None => builder.body(Body::empty())?,
    };
    dispatch(app, req).await
}

/// Come `send`, ma il body viene inviato così com'è (anche JSON non valido).
pub async fn send_raw(app: &Router, method: &str, uri: &str, body: &str) -> anyhow::Result<Reply> {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))?;
    dispatch(app, req).await
}

async fn dispatch(app: &Router, req: Request<Body>) -> anyhow::Result<Reply> {
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(Reply { status, text: String::from_utf8(bytes.to_vec())? })
}
