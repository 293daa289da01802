use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

pub const DEFAULT_PAGE_LIMIT: usize = 10;
pub const MAX_PAGE_LIMIT: usize = 100;
pub const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Song {
    pub id: i64,
    #[serde(rename = "group")]
    pub group_name: String,
    #[serde(rename = "song")]
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub lyrics: String,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /songs` and `PUT /songs/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SongPayload {
    pub group: String,
    pub song: String,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub lyrics: String,
    #[serde(default)]
    pub link: Option<String>,
}

/// Listing filters. Text filters match case-insensitive substrings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SongFilter {
    pub group: Option<String>,
    pub song: Option<String>,
    pub lyrics: Option<String>,
    pub link: Option<String>,
    pub release_from: Option<NaiveDate>,
    pub release_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
}

impl Pagination {
    /// Row offset of `page`, or `None` when it does not fit a SQL `OFFSET`.
    pub fn checked_offset(page: usize, limit: usize) -> Option<i64> {
        page.checked_sub(1)?
            .checked_mul(limit)
            .and_then(|offset| i64::try_from(offset).ok())
    }

    pub fn offset(&self) -> i64 {
        Self::checked_offset(self.page, self.limit).unwrap_or(i64::MAX)
    }
}

/// Query string of `GET /songs`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListSongsQuery {
    pub group: Option<String>,
    pub song: Option<String>,
    pub lyrics: Option<String>,
    pub link: Option<String>,
    pub release_from: Option<NaiveDate>,
    pub release_to: Option<NaiveDate>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl ListSongsQuery {
    /// Blank text filters are dropped.
    pub fn filter(&self) -> SongFilter {
        fn non_blank(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }
        SongFilter {
            group: non_blank(&self.group),
            song: non_blank(&self.song),
            lyrics: non_blank(&self.lyrics),
            link: non_blank(&self.link),
            release_from: self.release_from,
            release_to: self.release_to,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SongList {
    pub songs: Vec<Song>,
    pub page: usize,
    pub limit: usize,
    pub total: i64,
}

/// Query string of `GET /songs/{id}/lyrics`: either a `start`/`end` verse
/// range or a `page`/`limit` verse page.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct LyricsQuery {
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LyricsResponse {
    pub id: i64,
    pub group: String,
    pub song: String,
    pub total_verses: usize,
    /// 1-based, inclusive
    pub from: usize,
    pub to: usize,
    pub verses: Vec<String>,
    pub text: String,
}
