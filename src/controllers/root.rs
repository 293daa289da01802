use axum::{Json, http::StatusCode, response::IntoResponse};

use crate::controllers::song::SongController;

pub struct RootController;

impl RootController {
    pub async fn root() -> impl IntoResponse {
        Json(serde_json::json!({
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }))
    }

    pub async fn health_check(songs: &SongController) -> axum::response::Response {
        match songs.health_check().await {
            Ok(()) => (StatusCode::OK, Json(serde_json::json!({"status": "ok"}))).into_response(),
            Err(e) => e.into_response(),
        }
    }
}
