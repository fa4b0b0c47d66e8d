//! # ori-api
//!
//! The HTTP routing and orchestration layer for Oriana.

pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use ori_core::services::{MediaService, UserService};
use ori_core::traits::IdentityProvider;

pub use error::ApiError;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub media: MediaService,
    pub users: UserService,
    pub identity: Arc<dyn IdentityProvider>,
}

/// Builds the full router.
///
/// Everything under `/api` requires a bearer token; `/health` does not.
/// `cors_origins` empty means any origin.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let protected = Router::new()
        .route("/api/media/me", get(handlers::list_media))
        .route("/api/media/me/stats", get(handlers::media_stats))
        .route("/api/media", post(handlers::create_media))
        .route(
            "/api/media/{id}",
            put(handlers::update_media).delete(handlers::delete_media),
        )
        .route("/api/media/{id}/favorite", put(handlers::toggle_favorite))
        .route("/api/users/sync", post(handlers::sync_user))
        .route("/api/users/me", get(handlers::get_me))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let public = Router::new().route("/health", get(handlers::health));

    let app = Router::new().merge(protected).merge(public).with_state(state);
    middleware::standard_layers(app, cors_origins)
}
