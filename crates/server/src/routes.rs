pub mod admin;
pub mod locations;
pub mod photos;

use std::path::PathBuf;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use common::types::Health;
use configs::StorageConfig;
use service::photos::URL_PREFIX;

use crate::state::AppState;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Answer a bare `OPTIONS` with an empty 200; real CORS preflights are
/// already answered by the CORS layer.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Router-level settings that are not part of the handler state.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub frontend_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl From<&StorageConfig> for RouterOptions {
    fn from(s: &StorageConfig) -> Self {
        Self { frontend_dir: PathBuf::from(&s.frontend_dir), max_upload_bytes: s.max_upload_bytes }
    }
}

/// Build the full application router: pages, JSON API, uploads and health.
pub fn build_router(state: AppState, cors: CorsLayer, opts: &RouterOptions) -> Router {
    // Pages
    let pages = Router::new()
        .route_service("/", ServeFile::new(opts.frontend_dir.join("index.html")))
        .route_service("/admin", ServeFile::new(opts.frontend_dir.join("admin.html")))
        .route("/health", get(health));

    // Location and photo API
    let api = Router::new()
        .route("/api/update_location", post(locations::update_location).options(preflight))
        .route("/api/get_locations", get(locations::get_locations).options(preflight))
        .route("/api/get_user_history", get(locations::get_user_history).options(preflight))
        .route("/api/upload_photo", post(photos::upload_photo).options(preflight));

    // Destructive admin operations
    let admin_routes = Router::new()
        .route("/api/delete_all_users", post(admin::delete_all_users).options(preflight))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin::require_admin_token,
        ));

    // ServeDir refuses `..` and absolute segments, keeping reads inside the upload dir
    let uploads = ServeDir::new(state.photos.dir());

    // Compose
    pages
        .merge(api)
        .merge(admin_routes)
        .nest_service(URL_PREFIX, uploads)
        .layer(DefaultBodyLimit::max(opts.max_upload_bytes))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
