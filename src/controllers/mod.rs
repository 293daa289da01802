pub mod info;
pub mod root;
pub mod song;
pub use info::MusicInfoClient;
pub use root::RootController;
pub use song::SongController;
