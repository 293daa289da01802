use axum::extract::State;

use crate::controllers::RootController;
use crate::state::AppState;

pub async fn root_route() -> impl axum::response::IntoResponse {
    RootController::root().await
}

pub async fn health_check_route(State(state): State<AppState>) -> axum::response::Response {
    RootController::health_check(&state.songs).await
}
