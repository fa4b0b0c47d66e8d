//! # ori-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the core
//! services. Handlers only translate; every rule lives in `ori-core`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use ori_core::models::{Identity, MediaItem, UserProfile};
use ori_core::query::{MediaFilter, SortSpec};
use ori_core::stats::LibraryStats;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{ApiError, AppState};

/// Query string accepted by the list and stats endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub media_type: Option<String>,
    pub status: Option<String>,
    pub favorite: Option<String>,
    pub sort_by: Option<String>,
}

impl ListParams {
    fn filter(&self) -> MediaFilter {
        MediaFilter::from_params(
            self.media_type.as_deref(),
            self.status.as_deref(),
            self.favorite.as_deref(),
        )
    }
}

/// A media item as returned to clients, with the derived `dateLogged`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItemView {
    #[serde(flatten)]
    pub item: MediaItem,
    pub date_logged: DateTime<Utc>,
}

impl From<MediaItem> for MediaItemView {
    fn from(item: MediaItem) -> Self {
        let date_logged = item.date_logged();
        Self { item, date_logged }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "oriana",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/media/me
pub async fn list_media(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<MediaItemView>>, ApiError> {
    let sort = SortSpec::parse(params.sort_by.as_deref());
    let items = state.media.list(&identity.uid, &params.filter(), &sort).await?;
    Ok(Json(items.into_iter().map(MediaItemView::from).collect()))
}

/// GET /api/media/me/stats
pub async fn media_stats(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<ListParams>,
) -> Result<Json<LibraryStats>, ApiError> {
    Ok(Json(state.media.stats(&identity.uid, &params.filter()).await?))
}

/// POST /api/media
pub async fn create_media(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<MediaItemView>), ApiError> {
    let Json(body) = body?;
    let item = state.media.create(&identity.uid, &body).await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// PUT /api/media/{id}
pub async fn update_media(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MediaItemView>, ApiError> {
    let Json(body) = body?;
    let item = state.media.update(&identity.uid, &id, &body).await?;
    Ok(Json(item.into()))
}

/// PUT /api/media/{id}/favorite
pub async fn toggle_favorite(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MediaItemView>, ApiError> {
    let Json(body) = body?;
    let item = state.media.set_favorite(&identity.uid, &id, &body).await?;
    Ok(Json(item.into()))
}

/// DELETE /api/media/{id}
pub async fn delete_media(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.media.delete(&identity.uid, &id).await?;
    Ok(Json(json!({ "message": "Media item deleted successfully" })))
}

/// POST /api/users/sync
pub async fn sync_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.users.sync(&identity).await?))
}

/// GET /api/users/me
pub async fn get_me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.users.me(&identity.uid).await?))
}
