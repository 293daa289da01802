use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::controllers::info::MusicInfoError;
use crate::lyrics::VerseError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("song {0} not found")]
    SongNotFound(i64),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Verse(#[from] VerseError),

    #[error("song already exists: {group} - {song}")]
    Conflict { group: String, song: String },

    #[error("music info lookup failed: {0}")]
    MusicInfo(#[from] MusicInfoError),

    #[error(transparent)]
    JsonBody(#[from] JsonRejection),

    #[error(transparent)]
    PathParams(#[from] PathRejection),

    #[error(transparent)]
    QueryParams(#[from] QueryRejection),

    #[error("database unavailable: {0}")]
    Unavailable(#[source] StoreError),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { group, song } => AppError::Conflict { group, song },
            StoreError::Database(e) => AppError::Database(e),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::SongNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::Verse(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::MusicInfo(_) => StatusCode::BAD_GATEWAY,
            AppError::JsonBody(e) => e.status(),
            AppError::PathParams(e) => e.status(),
            AppError::QueryParams(e) => e.status(),
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Database(e) => {
                error!("Database error: {}", e);
                "internal server error".to_string()
            }
            AppError::Unavailable(e) => {
                error!("Health check failed: {}", e);
                "database unavailable".to_string()
            }
            AppError::MusicInfo(e) => {
                warn!("Music info lookup failed: {}", e);
                self.to_string()
            }
            AppError::JsonBody(e) => e.body_text(),
            AppError::PathParams(e) => e.body_text(),
            AppError::QueryParams(e) => e.body_text(),
            _ => self.to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
