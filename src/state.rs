use std::sync::Arc;

use crate::controllers::{MusicInfoClient, SongController};
use crate::store::SongStore;

#[derive(Clone)]
pub struct AppState {
    pub songs: Arc<SongController>,
}

impl AppState {
    pub fn new(store: Arc<dyn SongStore>, music_info: Option<MusicInfoClient>) -> Self {
        AppState {
            songs: Arc::new(SongController::new(store, music_info)),
        }
    }
}
