use axum::{
    extract::{multipart::{MultipartError, MultipartRejection}, Multipart, State},
    Json,
};
use serde::Serialize;

use service::{errors::ServiceError, photos::store::NO_PHOTO_FILE};

use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub photo_url: String,
}

fn multipart_error(e: MultipartError) -> ApiError {
    ApiError::new(e.status(), e.body_text())
}

/// Store the multipart file field `photo` and return its public URL.
pub async fn upload_photo(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|_| ServiceError::upload(NO_PHOTO_FILE))?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("photo") {
            continue;
        }
        // a plain form value named `photo` is not a file
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let bytes = field.bytes().await.map_err(multipart_error)?;
        let stored = state.photos.save(&file_name, &bytes).await?;
        return Ok(Json(UploadResponse {
            message: "Photo uploaded successfully",
            photo_url: stored.url,
        }));
    }

    Err(ServiceError::upload(NO_PHOTO_FILE).into())
}
