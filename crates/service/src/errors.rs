use std::fmt::Display;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("upload rejected: {0}")]
    Upload(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl ServiceError {
    pub fn validation(msg: &str) -> Self { Self::Validation(msg.to_string()) }
    pub fn upload(msg: &str) -> Self { Self::Upload(msg.to_string()) }
    pub fn persistence(e: impl Display) -> Self { Self::Persistence(e.to_string()) }
}
