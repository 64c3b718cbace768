//! HTTP controller layer. Adapts the core library and refresher operations
//! to a JSON API for whatever front end sits on top; the core crate never
//! sees an HTTP type. Mutating track endpoints answer with the refreshed
//! listing plus a short human-readable status line, mirroring the
//! lightweight feedback model of the page.

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use musebox_core::library::MediaLibrary;
use musebox_core::refresh::Refresher;
use musebox_core::state::DailyState;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::io::ReaderStream;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

// Big enough for a FLAC album rip.
const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

static UPLOAD_SEQ: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

/// Staging path for one upload payload. Process id plus a process-wide
/// counter keeps simultaneous uploads from overwriting each other.
fn staging_path() -> PathBuf {
    let seq = UPLOAD_SEQ.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    std::env::temp_dir().join(format!("musebox-upload-{}-{}", std::process::id(), seq))
}

#[derive(Clone)]
pub struct HttpState {
    pub library: Arc<MediaLibrary>,
    pub refresher: Arc<Refresher>,
    pub state_file: PathBuf,
}

#[derive(Serialize)]
struct TracksResponse {
    tracks: Vec<String>,
    message: String,
}

#[derive(Serialize)]
struct PlayResponse {
    path: String,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Deserialize)]
struct RenameRequest {
    from: String,
    to: String,
}

#[derive(Deserialize)]
struct DeleteRequest {
    names: Vec<String>,
}

pub fn router(state: HttpState, photo_dir: PathBuf, music_dir: PathBuf) -> Router {
    Router::new()
        .route("/api/daily", get(get_daily))
        .route("/api/tracks", get(list_tracks).post(upload_track))
        .route("/api/tracks/search", get(search_tracks))
        .route("/api/tracks/rename", post(rename_track))
        .route("/api/tracks/delete", post(delete_tracks))
        .route("/api/tracks/play", get(play_nothing))
        .route("/api/tracks/play/:name", get(play_track))
        .route("/api/tracks/download/:name", get(download_track))
        .nest_service("/photo", ServeDir::new(photo_dir))
        .nest_service("/music", ServeDir::new(music_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn start_server(
    bind_address: String,
    port: u16,
    state: HttpState,
    photo_dir: PathBuf,
    music_dir: PathBuf,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let app = router(state, photo_dir, music_dir);

        let addr = format!("{}:{}", bind_address, port);
        let listener = match TcpListener::bind(&addr).await {
            Ok(l) => l,
            Err(e) => {
                error!("Failed to bind HTTP server to {}: {}", addr, e);
                return;
            }
        };

        info!("HTTP API server listening on http://{}", addr);

        if let Err(e) = axum::serve(listener, app).await {
            error!("HTTP server error: {}", e);
        }
    })
}

/// Best-effort listing for the (tracks, message) responses; a directory that
/// cannot be read at all shows up as an empty list, the message still tells
/// the user what happened to their action.
fn listing(library: &MediaLibrary) -> Vec<String> {
    library.list().unwrap_or_default()
}

async fn get_daily(State(state): State<HttpState>) -> Result<Json<DailyState>, (StatusCode, String)> {
    match DailyState::load(&state.state_file) {
        Ok(daily) => Ok(Json(daily)),
        Err(e) => {
            // Missing or corrupt state both mean "refresh now and serve that".
            warn!("[http] daily state unavailable ({e}), refreshing immediately");
            state
                .refresher
                .run_once()
                .await
                .map(Json)
                .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, e.to_string()))
        }
    }
}

async fn list_tracks(
    State(state): State<HttpState>,
) -> Result<Json<Vec<String>>, (StatusCode, String)> {
    state
        .library
        .list()
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

async fn search_tracks(
    State(state): State<HttpState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<String>>, (StatusCode, String)> {
    state
        .library
        .search(&query.q)
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

async fn upload_track(
    State(state): State<HttpState>,
    mut multipart: Multipart,
) -> Result<Json<TracksResponse>, (StatusCode, String)> {
    let mut uploaded: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        let Some(original_name) = field.file_name().map(|n| n.to_string()) else {
            continue;
        };
        if original_name.is_empty() {
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

        // Stage the payload, then let the library move it into place.
        let staging = staging_path();
        tokio::fs::write(&staging, &bytes)
            .await
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

        match state.library.add(&staging, &original_name) {
            Ok(name) => {
                info!("[http] uploaded '{}' ({} bytes)", name, bytes.len());
                uploaded = Some(name);
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&staging).await;
                return Ok(Json(TracksResponse {
                    tracks: listing(&state.library),
                    message: e.to_string(),
                }));
            }
        }
    }

    let message = match uploaded {
        Some(name) => format!("'{name}' uploaded!"),
        None => "please choose a file to upload".to_string(),
    };
    Ok(Json(TracksResponse {
        tracks: listing(&state.library),
        message,
    }))
}

async fn rename_track(
    State(state): State<HttpState>,
    Json(req): Json<RenameRequest>,
) -> Json<TracksResponse> {
    let message = match state.library.rename(&req.from, &req.to) {
        Ok(new_name) => format!("renamed '{}' to '{}'!", req.from, new_name),
        Err(e) => e.to_string(),
    };
    Json(TracksResponse {
        tracks: listing(&state.library),
        message,
    })
}

async fn delete_tracks(
    State(state): State<HttpState>,
    Json(req): Json<DeleteRequest>,
) -> Json<TracksResponse> {
    let message = match state.library.delete(&req.names) {
        Ok(removed) => format!("deleted: {}", removed.join(", ")),
        Err(e) if e.removed.is_empty() => e.to_string(),
        Err(e) => format!("deleted: {}; then stopped: {}", e.removed.join(", "), e),
    };
    Json(TracksResponse {
        tracks: listing(&state.library),
        message,
    })
}

/// No track selected: not an error, just nothing to play.
async fn play_nothing() -> Json<PlayResponse> {
    Json(PlayResponse {
        path: String::new(),
    })
}

async fn play_track(
    State(state): State<HttpState>,
    Path(name): Path<String>,
) -> Result<Json<PlayResponse>, (StatusCode, String)> {
    match state.library.resolve(&name) {
        Ok(Some(path)) => Ok(Json(PlayResponse {
            path: path.to_string_lossy().into_owned(),
        })),
        Ok(None) => Ok(Json(PlayResponse {
            path: String::new(),
        })),
        Err(e) => Err((StatusCode::NOT_FOUND, e.to_string())),
    }
}

async fn download_track(
    State(state): State<HttpState>,
    Path(name): Path<String>,
) -> Result<Response, (StatusCode, String)> {
    let path = match state.library.resolve(&name) {
        Ok(Some(path)) => path,
        Ok(None) => return Err((StatusCode::NOT_FOUND, "no file selected".to_string())),
        Err(e) => return Err((StatusCode::NOT_FOUND, e.to_string())),
    };

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let stream = ReaderStream::new(file);

    let response = (
        [
            (header::CONTENT_TYPE, content_type_for(&name)),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{name}\""),
            ),
        ],
        Body::from_stream(stream),
    )
        .into_response();
    Ok(response)
}

fn content_type_for(name: &str) -> String {
    let lower = name.to_lowercase();
    if lower.ends_with(".mp3") {
        "audio/mpeg"
    } else if lower.ends_with(".flac") {
        "audio/flac"
    } else {
        "application/octet-stream"
    }
    .to_string()
}
