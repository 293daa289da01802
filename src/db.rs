use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder, postgres::PgPoolOptions};
use tracing::{debug, instrument};

use crate::models::group::Group;
use crate::models::song::{Pagination, Song, SongFilter, SongPayload};
use crate::store::{SongPage, SongStore, StoreError, like_pattern};

const SONG_SELECT: &str = "SELECT s.id, g.name AS group_name, s.title, s.release_date, s.lyrics, s.link, s.created_at, s.updated_at
     FROM songs s JOIN groups g ON g.id = s.group_id";

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    async fn upsert_group(conn: &mut PgConnection, name: &str) -> Result<i64, sqlx::Error> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO groups (name) VALUES ($1)
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
             RETURNING id",
        )
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

        Ok(id)
    }

    async fn fetch_song(conn: &mut PgConnection, id: i64) -> Result<Song, sqlx::Error> {
        sqlx::query_as::<_, Song>(&format!("{} WHERE s.id = $1", SONG_SELECT))
            .bind(id)
            .fetch_one(&mut *conn)
            .await
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &SongFilter) {
    query.push(" WHERE TRUE");
    if let Some(group) = &filter.group {
        query.push(" AND g.name ILIKE ").push_bind(like_pattern(group));
    }
    if let Some(song) = &filter.song {
        query.push(" AND s.title ILIKE ").push_bind(like_pattern(song));
    }
    if let Some(lyrics) = &filter.lyrics {
        query.push(" AND s.lyrics ILIKE ").push_bind(like_pattern(lyrics));
    }
    if let Some(link) = &filter.link {
        query.push(" AND s.link ILIKE ").push_bind(like_pattern(link));
    }
    if let Some(from) = filter.release_from {
        query.push(" AND s.release_date >= ").push_bind(from);
    }
    if let Some(to) = filter.release_to {
        query.push(" AND s.release_date <= ").push_bind(to);
    }
}

fn count_query(filter: &SongFilter) -> QueryBuilder<'static, Postgres> {
    let mut query =
        QueryBuilder::new("SELECT COUNT(*) FROM songs s JOIN groups g ON g.id = s.group_id");
    push_filters(&mut query, filter);
    query
}

fn list_query(filter: &SongFilter, pagination: Pagination) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(SONG_SELECT);
    push_filters(&mut query, filter);
    query
        .push(" ORDER BY s.id LIMIT ")
        .push_bind(pagination.limit as i64)
        .push(" OFFSET ")
        .push_bind(pagination.offset());
    query
}

fn map_write_error(err: sqlx::Error, song: &SongPayload) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Conflict {
            group: song.group.clone(),
            song: song.song.clone(),
        },
        _ => StoreError::Database(err),
    }
}

#[async_trait::async_trait]
impl SongStore for Database {
    #[instrument(skip(self, song), fields(group = %song.group, song = %song.song), level = "debug")]
    async fn create_song(&self, song: &SongPayload) -> Result<Song, StoreError> {
        let mut tx = self.pool.begin().await?;

        let group_id = Self::upsert_group(&mut tx, &song.group).await?;
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO songs (group_id, title, release_date, lyrics, link)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(group_id)
        .bind(&song.song)
        .bind(song.release_date)
        .bind(&song.lyrics)
        .bind(&song.link)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, song))?;

        let stored = Self::fetch_song(&mut tx, id).await?;
        tx.commit().await?;
        debug!(id, "song inserted");

        Ok(stored)
    }

    async fn get_song(&self, id: i64) -> Result<Option<Song>, StoreError> {
        let song = sqlx::query_as::<_, Song>(&format!("{} WHERE s.id = $1", SONG_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(song)
    }

    #[instrument(skip(self), level = "debug")]
    async fn list_songs(
        &self,
        filter: &SongFilter,
        pagination: Pagination,
    ) -> Result<SongPage, StoreError> {
        let total: i64 = count_query(filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;
        let songs = list_query(filter, pagination)
            .build_query_as::<Song>()
            .fetch_all(&self.pool)
            .await?;

        Ok(SongPage { songs, total })
    }

    #[instrument(skip(self, song), fields(group = %song.group, song = %song.song), level = "debug")]
    async fn update_song(&self, id: i64, song: &SongPayload) -> Result<Option<Song>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let group_id = Self::upsert_group(&mut tx, &song.group).await?;
        let updated = sqlx::query(
            "UPDATE songs
             SET group_id = $1, title = $2, release_date = $3, lyrics = $4, link = $5, updated_at = NOW()
             WHERE id = $6",
        )
        .bind(group_id)
        .bind(&song.song)
        .bind(song.release_date)
        .bind(&song.lyrics)
        .bind(&song.link)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, song))?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        let stored = Self::fetch_song(&mut tx, id).await?;
        tx.commit().await?;

        Ok(Some(stored))
    }

    async fn delete_song(&self, id: i64) -> Result<bool, StoreError> {
        let deleted = sqlx::query("DELETE FROM songs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(deleted.rows_affected() > 0)
    }

    async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
        let groups = sqlx::query_as::<_, Group>(
            "SELECT g.id, g.name, COUNT(s.id) AS song_count, g.created_at
             FROM groups g LEFT JOIN songs s ON s.group_id = g.id
             GROUP BY g.id
             ORDER BY g.name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
