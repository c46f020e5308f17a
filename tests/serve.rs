// tests/serve.rs
//
// HTTP publisher routes, driven through the router without a socket.
//
mod common;

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use dex_board::board::{BoardCell, Entry, Leaderboard};
use dex_board::config::RenderOptions;
use dex_board::render;
use dex_board::serve::{create_router, ServeState};

use common::PNG_MAGIC;

const BOUNDARY: &str = "dexboundary";

fn state(dir: &Path, token: &str) -> ServeState {
    ServeState {
        board: Arc::new(BoardCell::new()),
        artifact: dir.join("leaderboard.png"),
        api_token: Arc::from(token),
    }
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, headers, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn upload(key: Option<&str>, field: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"lb.png\"\r\nContent-Type: image/png\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let mut req = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
    if let Some(key) = key {
        req = req.header("X-API-KEY", key);
    }
    req.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let tmp = tempfile::tempdir().unwrap();
    let (status, _, body) = send(create_router(state(tmp.path(), "")), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "OK");
}

#[tokio::test]
async fn index_links_the_image() {
    let tmp = tempfile::tempdir().unwrap();
    let (status, _, body) = send(create_router(state(tmp.path(), "")), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("/leaderboard.png"));
}

#[tokio::test]
async fn image_is_404_before_first_render() {
    let tmp = tempfile::tempdir().unwrap();
    let (status, _, _) = send(create_router(state(tmp.path(), "")), get("/leaderboard.png")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn image_is_served_uncached() {
    let tmp = tempfile::tempdir().unwrap();
    let st = state(tmp.path(), "");
    let opts = RenderOptions { out_path: st.artifact.clone(), ..RenderOptions::default() };
    render::write_artifact(&Leaderboard::empty(Utc::now()), &opts).unwrap();

    let (status, headers, body) = send(create_router(st), get("/leaderboard.png")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "image/png");
    assert!(headers[header::CACHE_CONTROL].to_str().unwrap().contains("no-store"));
    assert!(body.starts_with(PNG_MAGIC));
}

#[tokio::test]
async fn debug_reports_published_rows() {
    let tmp = tempfile::tempdir().unwrap();
    let st = state(tmp.path(), "");

    let (_, _, body) = send(create_router(st.clone()), get("/debug")).await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["count"], 0);
    assert!(json["generated_at"].is_null());

    st.board.publish(Leaderboard::build(
        vec![
            Entry { file: "a.json".to_string(), name: "Ash".to_string(), count: 151 },
            Entry { file: "b.json".to_string(), name: "Brock".to_string(), count: 20 },
        ],
        30,
        Utc::now(),
    ));
    let (_, _, body) = send(create_router(st), get("/debug")).await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["count"], 2);
    assert_eq!(json["rows"][0][0], "Ash");
    assert_eq!(json["rows"][0][1], 151);
    assert!(json["generated_at"].is_string());
}

#[tokio::test]
async fn upload_requires_matching_key() {
    let tmp = tempfile::tempdir().unwrap();
    let st = state(tmp.path(), "s3cret");

    let (status, _, _) = send(create_router(st.clone()), upload(Some("wrong"), "file", b"img")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _, _) = send(create_router(st.clone()), upload(None, "file", b"img")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(!st.artifact.exists());
}

#[tokio::test]
async fn upload_replaces_artifact() {
    let tmp = tempfile::tempdir().unwrap();
    let st = state(tmp.path(), "s3cret");

    let (status, _, body) = send(create_router(st.clone()), upload(Some("s3cret"), "file", b"operator image")).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["ok"], true);
    assert_eq!(std::fs::read(&st.artifact).unwrap(), b"operator image");
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let st = state(tmp.path(), "s3cret");
    let (status, _, _) = send(create_router(st), upload(Some("s3cret"), "picture", b"img")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_disabled_without_token() {
    let tmp = tempfile::tempdir().unwrap();
    let st = state(tmp.path(), "");
    let (status, _, _) = send(create_router(st), upload(Some(""), "file", b"img")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
