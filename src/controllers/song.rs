use std::sync::Arc;

use tracing::{debug, info};

use crate::controllers::info::{MusicInfoClient, MusicInfoError, SongDetail, parse_release_date};
use crate::error::AppError;
use crate::lyrics::{join_verses, page_bounds, range_bounds, split_verses};
use crate::models::group::Group;
use crate::models::song::{
    DEFAULT_PAGE_LIMIT, LyricsQuery, LyricsResponse, ListSongsQuery, MAX_NAME_LEN,
    MAX_PAGE_LIMIT, Pagination, Song, SongList, SongPayload,
};
use crate::store::SongStore;

pub struct SongController {
    store: Arc<dyn SongStore>,
    music_info: Option<MusicInfoClient>,
}

fn normalize_name(field: &str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, MAX_NAME_LEN
        )));
    }
    Ok(value.to_string())
}

fn normalize_link(link: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(link) = link.map(str::trim).filter(|l| !l.is_empty()) else {
        return Ok(None);
    };
    let parsed = url::Url::parse(link)
        .map_err(|e| AppError::Validation(format!("link is not a valid url: {}", e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::Validation(
            "link must be an http or https url".to_string(),
        ));
    }
    Ok(Some(link.to_string()))
}

/// Trim and validate a song payload before it reaches the store.
pub fn normalize_payload(payload: SongPayload) -> Result<SongPayload, AppError> {
    Ok(SongPayload {
        group: normalize_name("group", &payload.group)?,
        song: normalize_name("song", &payload.song)?,
        release_date: payload.release_date,
        link: normalize_link(payload.link.as_deref())?,
        lyrics: payload.lyrics,
    })
}

/// Fill the fields the caller left empty from looked-up song details.
pub fn apply_detail(payload: &mut SongPayload, detail: SongDetail) -> Result<(), AppError> {
    if payload.lyrics.trim().is_empty() {
        if let Some(text) = detail.text {
            payload.lyrics = text;
        }
    }
    if payload.release_date.is_none() {
        if let Some(date) = detail.release_date.as_deref().filter(|d| !d.trim().is_empty()) {
            payload.release_date = Some(parse_release_date(date)?);
        }
    }
    if payload.link.is_none() {
        if let Some(link) = detail.link {
            payload.link = normalize_link(Some(&link))
                .map_err(|_| MusicInfoError::InvalidLink(link.clone()))?;
        }
    }
    Ok(())
}

/// Parse a path verse selector: `3` for a single verse, `2-4` for a range.
pub fn parse_verse_selector(selector: &str) -> Result<LyricsQuery, AppError> {
    let number = |value: &str| {
        value.trim().parse::<usize>().map_err(|_| {
            AppError::Validation(format!("invalid verse selector: {}", selector))
        })
    };
    let (start, end) = match selector.split_once('-') {
        Some((start, end)) => (number(start)?, number(end)?),
        None => {
            let verse = number(selector)?;
            (verse, verse)
        }
    };
    Ok(LyricsQuery {
        start: Some(start),
        end: Some(end),
        ..LyricsQuery::default()
    })
}

pub fn pagination(page: Option<usize>, limit: Option<usize>) -> Result<Pagination, AppError> {
    let page = page.unwrap_or(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    if page < 1 {
        return Err(AppError::Validation("page must be at least 1".to_string()));
    }
    if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_LIMIT
        )));
    }
    if Pagination::checked_offset(page, limit).is_none() {
        return Err(AppError::Validation(format!("page {} is too large", page)));
    }
    Ok(Pagination { page, limit })
}

/// Pick the verses of `song` requested by `query`.
pub fn select_lyrics(song: &Song, query: LyricsQuery) -> Result<LyricsResponse, AppError> {
    let ranged = query.start.is_some() || query.end.is_some();
    let paged = query.page.is_some() || query.limit.is_some();
    if ranged && paged {
        return Err(AppError::Validation(
            "use either start/end or page/limit, not both".to_string(),
        ));
    }

    let verses = split_verses(&song.lyrics);
    let bounds = if paged {
        page_bounds(verses.len(), query.page.unwrap_or(1), query.limit.unwrap_or(1))?
    } else {
        range_bounds(verses.len(), query.start.unwrap_or(1), query.end.unwrap_or(0))?
    };

    let from = bounds.start + 1;
    let to = bounds.end;
    let selected = &verses[bounds];
    Ok(LyricsResponse {
        id: song.id,
        group: song.group_name.clone(),
        song: song.title.clone(),
        total_verses: verses.len(),
        from,
        to,
        text: join_verses(selected),
        verses: selected.iter().map(|v| v.to_string()).collect(),
    })
}

impl SongController {
    pub fn new(store: Arc<dyn SongStore>, music_info: Option<MusicInfoClient>) -> Self {
        SongController { store, music_info }
    }

    pub async fn list(&self, query: ListSongsQuery) -> Result<SongList, AppError> {
        let pagination = pagination(query.page, query.limit)?;
        let filter = query.filter();
        let page = self.store.list_songs(&filter, pagination).await?;
        debug!(
            total = page.total,
            returned = page.songs.len(),
            "listed songs"
        );

        Ok(SongList {
            songs: page.songs,
            page: pagination.page,
            limit: pagination.limit,
            total: page.total,
        })
    }

    pub async fn get(&self, id: i64) -> Result<Song, AppError> {
        self.store
            .get_song(id)
            .await?
            .ok_or(AppError::SongNotFound(id))
    }

    pub async fn create(&self, payload: SongPayload) -> Result<Song, AppError> {
        let mut payload = normalize_payload(payload)?;

        if payload.lyrics.trim().is_empty() {
            if let Some(client) = &self.music_info {
                let detail = client.fetch(&payload.group, &payload.song).await?;
                apply_detail(&mut payload, detail)?;
            }
        }

        let song = self.store.create_song(&payload).await?;
        info!("Created song {}: {} - {}", song.id, song.group_name, song.title);
        Ok(song)
    }

    pub async fn update(&self, id: i64, payload: SongPayload) -> Result<Song, AppError> {
        let payload = normalize_payload(payload)?;
        let song = self
            .store
            .update_song(id, &payload)
            .await?
            .ok_or(AppError::SongNotFound(id))?;
        info!("Updated song {}", id);
        Ok(song)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.store.delete_song(id).await? {
            return Err(AppError::SongNotFound(id));
        }
        info!("Deleted song {}", id);
        Ok(())
    }

    pub async fn lyrics(&self, id: i64, query: LyricsQuery) -> Result<LyricsResponse, AppError> {
        let song = self.get(id).await?;
        select_lyrics(&song, query)
    }

    pub async fn lyrics_by_selector(
        &self,
        id: i64,
        selector: &str,
    ) -> Result<LyricsResponse, AppError> {
        let query = parse_verse_selector(selector)?;
        self.lyrics(id, query).await
    }

    pub async fn groups(&self) -> Result<Vec<Group>, AppError> {
        Ok(self.store.list_groups().await?)
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.store.ping().await.map_err(AppError::Unavailable)
    }
}
