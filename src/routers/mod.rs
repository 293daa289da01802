pub mod root;
pub mod song;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use root::{health_check_route, root_route};
pub use song::{list_groups_route, song_routes};

use crate::state::AppState;

pub fn make_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_route))
        .route("/health", get(health_check_route))
        .nest("/songs", song_routes())
        .route("/groups", get(list_groups_route))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
