pub mod group;
pub mod song;
