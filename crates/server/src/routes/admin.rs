use axum::{
    extract::{Query, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};

use common::types::MessageResponse;
use service::errors::ServiceError;

use crate::errors::ApiError;
use crate::state::AppState;

pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

#[derive(Debug, Deserialize)]
struct AdminTokenQuery {
    token: Option<String>,
}

pub async fn delete_all_users(State(state): State<AppState>) -> Result<Json<MessageResponse>, ApiError> {
    let removed = state.locations.delete_all().await?;
    info!(users = removed, "all users deleted");
    Ok(Json(MessageResponse { message: "All users deleted successfully" }))
}

/// Middleware: when an admin token is configured, require it in the
/// `X-Admin-Token` header (or query `token`). Preflight always passes.
pub async fn require_admin_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Ok(next.run(req).await);
    };
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let from_header = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    // fallback to the percent-decoded query param
    let token = from_header.or_else(|| {
        Query::<AdminTokenQuery>::try_from_uri(req.uri())
            .ok()
            .and_then(|Query(q)| q.token)
    });

    if token.as_deref() != Some(expected) {
        warn!(path = %req.uri().path(), "admin request without valid token");
        return Err(ServiceError::Unauthorized.into());
    }

    Ok(next.run(req).await)
}
