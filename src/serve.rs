// src/serve.rs
//! Artifact publisher: a thin HTTP front end over the refresh core.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Link to the image |
//! | GET | `/health` | Health check |
//! | GET | `/leaderboard.png` | Current artifact, never cached; 404 before the first render |
//! | GET | `/debug` | Last published ranking as JSON |
//! | POST | `/upload` | Operator override of the artifact (multipart `file`, `X-API-KEY` header) |
//!
//! Handlers only read the published board and the artifact file; the upload writes
//! the artifact through the same atomic replace the renderer uses.
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::board::BoardCell;
use crate::render;

pub const API_KEY_HEADER: &str = "x-api-key";
const NO_STORE: &str = "no-store, no-cache, must-revalidate, max-age=0";

#[derive(Clone)]
pub struct ServeState {
    pub board: Arc<BoardCell>,
    pub artifact: PathBuf,
    /// Empty disables `/upload`.
    pub api_token: Arc<str>,
}

pub fn create_router(state: ServeState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/leaderboard.png", get(handle_leaderboard_png))
        .route("/debug", get(handle_debug))
        .route("/upload", post(handle_upload))
        .with_state(state)
}

/// Bind `0.0.0.0:port` and serve until Ctrl-C.
pub async fn serve(state: ServeState, port: u16) -> io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    logf!("Serve: listening on http://{addr}");
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    logf!("Serve: shutting down");
}

type ApiError = (StatusCode, Json<Value>);

fn error_response(status: StatusCode, msg: &str) -> ApiError {
    (status, Json(json!({ "error": msg })))
}

// ── GET handlers ────────────────────────────────────────────────────

async fn handle_index() -> Html<&'static str> {
    Html(r#"<h3>CobbleDex Leaderboard</h3><p><a href="/leaderboard.png">View the leaderboard</a></p>"#)
}

async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

async fn handle_leaderboard_png(State(st): State<ServeState>) -> Response {
    let path = st.artifact.clone();
    match tokio::task::spawn_blocking(move || render::current_artifact(&path)).await {
        Ok(Ok(Some(bytes))) => (
            [
                (header::CONTENT_TYPE, "image/png"),
                (header::CACHE_CONTROL, NO_STORE),
                (header::PRAGMA, "no-cache"),
                (header::EXPIRES, "0"),
            ],
            bytes,
        )
            .into_response(),
        Ok(Ok(None)) => error_response(StatusCode::NOT_FOUND, "leaderboard not generated yet").into_response(),
        Ok(Err(e)) => {
            loge!("Serve: read {}: {e}", st.artifact.display());
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "cannot read artifact").into_response()
        }
        Err(e) => {
            loge!("Serve: read task: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "cannot read artifact").into_response()
        }
    }
}

async fn handle_debug(State(st): State<ServeState>) -> Json<Value> {
    Json(match st.board.current() {
        Some(board) => json!({
            "rows": board.pairs(),
            "count": board.len(),
            "generated_at": board.generated_at().to_rfc3339(),
        }),
        None => json!({ "rows": [], "count": 0, "generated_at": null }),
    })
}

// ── POST handlers ───────────────────────────────────────────────────

async fn handle_upload(
    State(st): State<ServeState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    if st.api_token.is_empty() {
        return Err(error_response(StatusCode::NOT_FOUND, "upload disabled"));
    }
    let key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !token_matches(key, &st.api_token) {
        logw!("Serve: upload rejected (bad api key)");
        return Err(error_response(StatusCode::UNAUTHORIZED, "unauthorized"));
    }

    let bad_request = |e: axum::extract::multipart::MultipartError| {
        error_response(StatusCode::BAD_REQUEST, &e.to_string())
    };
    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        if field.name() != Some("file") { continue; }
        let bytes = field.bytes().await.map_err(bad_request)?;
        if bytes.is_empty() {
            return Err(error_response(StatusCode::BAD_REQUEST, "empty file"));
        }

        let path = st.artifact.clone();
        let len = bytes.len();
        let written = tokio::task::spawn_blocking(move || render::replace_artifact(&path, &bytes)).await;
        return match written {
            Ok(Ok(())) => {
                logf!("Serve: artifact replaced by upload ({len} bytes)");
                Ok(Json(json!({ "ok": true })))
            }
            Ok(Err(e)) => {
                loge!("Serve: upload write: {e}");
                Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, "cannot write artifact"))
            }
            Err(e) => {
                loge!("Serve: upload task: {e}");
                Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, "cannot write artifact"))
            }
        };
    }
    Err(error_response(StatusCode::BAD_REQUEST, "missing file field"))
}

/// Length-and-content compare without an early exit on the first differing byte.
fn token_matches(given: &str, expected: &str) -> bool {
    given.len() == expected.len()
        && given
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
