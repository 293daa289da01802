//! Song library service: a song catalog over PostgreSQL with verse-level
//! lyrics lookup.

pub mod controllers;
pub mod db;
pub mod error;
pub mod extract;
pub mod lyrics;
pub mod models;
pub mod routers;
pub mod secrets;
pub mod state;
pub mod store;

pub use db::Database;
pub use error::AppError;
pub use routers::make_app;
pub use state::AppState;
pub use store::{SongStore, StoreError};
