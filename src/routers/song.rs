// Song routes
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::error::AppError;
use crate::extract::{JsonBody, PathParams, QueryParams};
use crate::models::group::Group;
use crate::models::song::{ListSongsQuery, LyricsQuery, LyricsResponse, Song, SongList, SongPayload};
use crate::state::AppState;

pub async fn list_songs_route(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListSongsQuery>,
) -> Result<Json<SongList>, AppError> {
    Ok(Json(state.songs.list(query).await?))
}

pub async fn create_song_route(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SongPayload>,
) -> Result<(StatusCode, Json<Song>), AppError> {
    let song = state.songs.create(payload).await?;
    Ok((StatusCode::CREATED, Json(song)))
}

pub async fn get_song_route(
    State(state): State<AppState>,
    PathParams(id): PathParams<i64>,
) -> Result<Json<Song>, AppError> {
    Ok(Json(state.songs.get(id).await?))
}

pub async fn update_song_route(
    State(state): State<AppState>,
    PathParams(id): PathParams<i64>,
    JsonBody(payload): JsonBody<SongPayload>,
) -> Result<Json<Song>, AppError> {
    Ok(Json(state.songs.update(id, payload).await?))
}

pub async fn delete_song_route(
    State(state): State<AppState>,
    PathParams(id): PathParams<i64>,
) -> Result<StatusCode, AppError> {
    state.songs.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn song_lyrics_route(
    State(state): State<AppState>,
    PathParams(id): PathParams<i64>,
    QueryParams(query): QueryParams<LyricsQuery>,
) -> Result<Json<LyricsResponse>, AppError> {
    Ok(Json(state.songs.lyrics(id, query).await?))
}

/// `GET /songs/{id}/lyrics/{verses}` where `verses` is `3` or `2-4`.
pub async fn song_verses_route(
    State(state): State<AppState>,
    PathParams((id, verses)): PathParams<(i64, String)>,
) -> Result<Json<LyricsResponse>, AppError> {
    Ok(Json(state.songs.lyrics_by_selector(id, &verses).await?))
}

pub async fn list_groups_route(State(state): State<AppState>) -> Result<Json<Vec<Group>>, AppError> {
    Ok(Json(state.songs.groups().await?))
}

pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_songs_route).post(create_song_route))
        .route(
            "/{id}",
            get(get_song_route)
                .put(update_song_route)
                .delete(delete_song_route),
        )
        .route("/{id}/lyrics", get(song_lyrics_route))
        .route("/{id}/lyrics/{verses}", get(song_verses_route))
}
