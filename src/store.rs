use thiserror::Error;

use crate::models::group::Group;
use crate::models::song::{Pagination, Song, SongFilter, SongPayload};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("song already exists: {group} - {song}")]
    Conflict { group: String, song: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One page of a filtered song listing plus the total number of matches.
#[derive(Debug)]
pub struct SongPage {
    pub songs: Vec<Song>,
    pub total: i64,
}

#[async_trait::async_trait]
pub trait SongStore: Send + Sync {
    async fn create_song(&self, song: &SongPayload) -> Result<Song, StoreError>;
    async fn get_song(&self, id: i64) -> Result<Option<Song>, StoreError>;
    async fn list_songs(
        &self,
        filter: &SongFilter,
        pagination: Pagination,
    ) -> Result<SongPage, StoreError>;
    /// `None` when no song has this id.
    async fn update_song(&self, id: i64, song: &SongPayload) -> Result<Option<Song>, StoreError>;
    /// `false` when no song has this id.
    async fn delete_song(&self, id: i64) -> Result<bool, StoreError>;
    async fn list_groups(&self) -> Result<Vec<Group>, StoreError>;
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Escape LIKE metacharacters and wrap the value for a substring match.
pub fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
pub mod memory {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    #[derive(Default)]
    struct Inner {
        next_song_id: i64,
        songs: BTreeMap<i64, Song>,
        groups: BTreeMap<String, Group>,
    }

    /// Song store backed by a map, for handler tests.
    #[derive(Default)]
    pub struct InMemorySongStore {
        inner: Mutex<Inner>,
        unavailable: bool,
    }

    impl InMemorySongStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// A store whose every call fails like a dropped database.
        pub fn unavailable() -> Self {
            Self {
                unavailable: true,
                ..Self::default()
            }
        }

        fn check(&self) -> Result<(), StoreError> {
            if self.unavailable {
                return Err(StoreError::Database(sqlx::Error::PoolClosed));
            }
            Ok(())
        }
    }

    impl Inner {
        fn ensure_group(&mut self, name: &str) {
            let next_id = self.groups.len() as i64 + 1;
            self.groups.entry(name.to_string()).or_insert_with(|| Group {
                id: next_id,
                name: name.to_string(),
                song_count: 0,
                created_at: Utc::now(),
            });
        }

        fn is_taken(&self, song: &SongPayload, except: Option<i64>) -> bool {
            self.songs.values().any(|s| {
                Some(s.id) != except && s.group_name == song.group && s.title == song.song
            })
        }
    }

    fn contains(haystack: &str, needle: &Option<String>) -> bool {
        match needle {
            Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        }
    }

    fn matches(song: &Song, filter: &SongFilter) -> bool {
        contains(&song.group_name, &filter.group)
            && contains(&song.title, &filter.song)
            && contains(&song.lyrics, &filter.lyrics)
            && contains(song.link.as_deref().unwrap_or(""), &filter.link)
            && filter
                .release_from
                .is_none_or(|from| song.release_date.is_some_and(|d| d >= from))
            && filter
                .release_to
                .is_none_or(|to| song.release_date.is_some_and(|d| d <= to))
    }

    #[async_trait::async_trait]
    impl SongStore for InMemorySongStore {
        async fn create_song(&self, song: &SongPayload) -> Result<Song, StoreError> {
            self.check()?;
            let mut inner = self.inner.lock().unwrap();
            if inner.is_taken(song, None) {
                return Err(StoreError::Conflict {
                    group: song.group.clone(),
                    song: song.song.clone(),
                });
            }
            inner.ensure_group(&song.group);
            inner.next_song_id += 1;
            let now = Utc::now();
            let stored = Song {
                id: inner.next_song_id,
                group_name: song.group.clone(),
                title: song.song.clone(),
                release_date: song.release_date,
                lyrics: song.lyrics.clone(),
                link: song.link.clone(),
                created_at: now,
                updated_at: now,
            };
            inner.songs.insert(stored.id, stored.clone());
            Ok(stored)
        }

        async fn get_song(&self, id: i64) -> Result<Option<Song>, StoreError> {
            self.check()?;
            Ok(self.inner.lock().unwrap().songs.get(&id).cloned())
        }

        async fn list_songs(
            &self,
            filter: &SongFilter,
            pagination: Pagination,
        ) -> Result<SongPage, StoreError> {
            self.check()?;
            let inner = self.inner.lock().unwrap();
            let matching: Vec<&Song> = inner.songs.values().filter(|s| matches(s, filter)).collect();
            Ok(SongPage {
                total: matching.len() as i64,
                songs: matching
                    .into_iter()
                    .skip(usize::try_from(pagination.offset()).unwrap_or(usize::MAX))
                    .take(pagination.limit)
                    .cloned()
                    .collect(),
            })
        }

        async fn update_song(&self, id: i64, song: &SongPayload) -> Result<Option<Song>, StoreError> {
            self.check()?;
            let mut inner = self.inner.lock().unwrap();
            if !inner.songs.contains_key(&id) {
                return Ok(None);
            }
            if inner.is_taken(song, Some(id)) {
                return Err(StoreError::Conflict {
                    group: song.group.clone(),
                    song: song.song.clone(),
                });
            }
            inner.ensure_group(&song.group);
            let Some(stored) = inner.songs.get_mut(&id) else {
                return Ok(None);
            };
            stored.group_name = song.group.clone();
            stored.title = song.song.clone();
            stored.release_date = song.release_date;
            stored.lyrics = song.lyrics.clone();
            stored.link = song.link.clone();
            stored.updated_at = Utc::now();
            Ok(Some(stored.clone()))
        }

        async fn delete_song(&self, id: i64) -> Result<bool, StoreError> {
            self.check()?;
            Ok(self.inner.lock().unwrap().songs.remove(&id).is_some())
        }

        async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
            self.check()?;
            let inner = self.inner.lock().unwrap();
            Ok(inner
                .groups
                .values()
                .map(|group| Group {
                    song_count: inner
                        .songs
                        .values()
                        .filter(|s| s.group_name == group.name)
                        .count() as i64,
                    ..group.clone()
                })
                .collect())
        }

        async fn ping(&self) -> Result<(), StoreError> {
            self.check()
        }
    }
}
