//! REST API endpoint handlers
//!
//! Handlers unpack the request and delegate to the services layer. Errors
//! become JSON bodies through `AppError`'s `IntoResponse`.

use crate::api::types::*;
use crate::error::Result;
use crate::services::{BlogService, WatchlistService};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Json, Path, State},
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;

// ============================================================================
// Health Check
// ============================================================================

pub async fn health_check() -> impl IntoResponse {
    Json(MessageResponse::ok("Watchlist server is running"))
}

// ============================================================================
// Watchlist
// ============================================================================

/// POST /api/save-watchlist
pub async fn save_watchlist(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SaveWatchlistResponse>> {
    let rows = WatchlistService::parse_save_body(&body)?;
    WatchlistService::save(&state, rows).map(Json)
}

/// GET /api/load-watchlist
pub async fn load_watchlist(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LoadWatchlistResponse>> {
    WatchlistService::load(&state).map(Json)
}

/// GET /api/db-info
pub async fn db_info(State(state): State<Arc<AppState>>) -> Result<Json<DbInfoResponse>> {
    WatchlistService::db_info(&state).map(Json)
}

/// GET /api/snapshots
pub async fn list_snapshots(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SnapshotListResponse>> {
    WatchlistService::list_snapshots(&state).map(Json)
}

/// GET /api/snapshot/:id
pub async fn get_snapshot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SnapshotResponse>> {
    WatchlistService::get_snapshot(&state, id).map(Json)
}

/// POST /api/clear-database
pub async fn clear_database(State(state): State<Arc<AppState>>) -> Result<Json<MessageResponse>> {
    WatchlistService::clear(&state).map(Json)
}

// ============================================================================
// Blogs
// ============================================================================

/// POST /api/blogs
pub async fn create_blog(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BlogRequest>,
) -> Result<Json<BlogSavedResponse>> {
    BlogService::create(&state, &request).map(Json)
}

/// GET /api/blogs
pub async fn list_blogs(State(state): State<Arc<AppState>>) -> Result<Json<BlogListResponse>> {
    BlogService::list(&state).map(Json)
}

/// GET /api/blogs/:id
pub async fn get_blog(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<BlogResponse>> {
    BlogService::get(&state, id).map(Json)
}

/// PUT /api/blogs/:id
pub async fn update_blog(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<BlogRequest>,
) -> Result<Json<BlogSavedResponse>> {
    BlogService::update(&state, id, &request).map(Json)
}

/// DELETE /api/blogs/:id
pub async fn delete_blog(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    BlogService::delete(&state, id).map(Json)
}

/// GET /api/images/:id - raw bytes with the stored content type
pub async fn get_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let image = BlogService::image(&state, id)?;
    Ok(([(header::CONTENT_TYPE, image.mime_type)], image.data))
}
