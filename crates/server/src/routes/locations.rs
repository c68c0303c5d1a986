use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use common::types::MessageResponse;
use service::locations::{LocationInput, LocationRecord};

use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub user_id: Option<String>,
}

/// Append one location to the caller's history.
pub async fn update_location(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    // a body that is not a JSON object carries none of the required fields
    let input = match body {
        Ok(Json(body)) => LocationInput::from_body(body),
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "unusable update_location body");
            LocationInput::default()
        }
    };
    let record = state.locations.record(input).await?;
    info!(timestamp = %record.timestamp, "location recorded");
    Ok(Json(MessageResponse { message: "Location updated successfully!" }))
}

pub async fn get_locations(State(state): State<AppState>) -> Json<BTreeMap<String, Vec<LocationRecord>>> {
    Json(state.locations.all().await)
}

pub async fn get_user_history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<LocationRecord>>, ApiError> {
    let user_id = q.user_id.unwrap_or_default();
    let history = state.locations.history(&user_id).await?;
    Ok(Json(history))
}
