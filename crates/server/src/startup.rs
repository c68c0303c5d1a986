use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::{
    locations::{LocationStore, ValidationRules},
    photos::PhotoStore,
    runtime,
};

use crate::errors::StartupError;
use crate::routes::{self, RouterOptions};
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad bind address: {e}")))
}

/// Open the stores named by `cfg` and build the router around them.
/// A data file that exists but cannot be parsed aborts here.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let storage = &cfg.storage;
    runtime::ensure_env(&storage.frontend_dir, &storage.data_file, &storage.upload_dir).await?;

    let rules = ValidationRules { allow_zero_coordinates: cfg.locations.allow_zero_coordinates };
    let locations = LocationStore::open(&storage.data_file, rules).await?;
    let photos = PhotoStore::new(&storage.upload_dir).await?;

    if cfg.admin.token.is_none() {
        warn!("no admin token configured; delete_all_users is open to every caller");
    }
    let state = AppState::new(locations, photos, cfg.admin.token.clone());

    Ok(routes::build_router(state, build_cors(), &RouterOptions::from(storage)))
}

/// Public entry: build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;

    let addr = bind_addr(&cfg)?;
    info!(%addr, data_file = %cfg.storage.data_file, "starting location server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
