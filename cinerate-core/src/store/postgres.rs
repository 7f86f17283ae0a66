//! Postgres-backed implementation of the movie cache store.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions};
use sqlx::query::Query;
use sqlx::Postgres;
use tracing::info;
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::store::{InsertOutcome, MovieStore, RatingRow};
use cinerate_model::{MediaType, MovieRecord, Review, ReviewId, UserId};

#[derive(Clone, Debug)]
pub struct PostgresMovieStore {
    pool: PgPool,
}

impl PostgresMovieStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(16)
            .acquire_timeout(Duration::from_secs(30))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;
        info!("movie store connected to Postgres");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|err| CoreError::Database(err.into()))?;
        info!("movie store migrations applied");
        Ok(())
    }
}

const MOVIE_COLUMNS: &str = "id, external_id, media_type, title, storyline, runtime_minutes, \
     languages, genre_ids, release_date, poster_path, backdrop_path, trailer_key, \
     directors, writers, cast_members, homepage, tags, review_refs, rating_sum, \
     created_at, updated_at";

const UPDATE_MOVIE_SQL: &str = r#"
    UPDATE movies SET
        title = $2,
        storyline = $3,
        runtime_minutes = $4,
        languages = $5,
        genre_ids = $6,
        release_date = $7,
        poster_path = $8,
        backdrop_path = $9,
        trailer_key = $10,
        directors = $11,
        writers = $12,
        cast_members = $13,
        homepage = $14,
        tags = $15,
        review_refs = $16,
        rating_sum = $17,
        updated_at = $18
    WHERE id = $1
"#;

#[derive(Debug, sqlx::FromRow)]
struct MovieRow {
    id: Uuid,
    external_id: String,
    media_type: String,
    title: String,
    storyline: String,
    runtime_minutes: i32,
    languages: serde_json::Value,
    genre_ids: serde_json::Value,
    release_date: Option<NaiveDate>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    trailer_key: Option<String>,
    directors: serde_json::Value,
    writers: serde_json::Value,
    cast_members: serde_json::Value,
    homepage: Option<String>,
    tags: serde_json::Value,
    review_refs: Vec<Uuid>,
    rating_sum: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MovieRow {
    fn into_record(self) -> Result<MovieRecord> {
        Ok(MovieRecord {
            id: self.id,
            external_id: self.external_id,
            media_type: parse_media_type(&self.media_type)?,
            title: self.title,
            storyline: self.storyline,
            runtime_minutes: self.runtime_minutes,
            languages: serde_json::from_value(self.languages)?,
            genre_ids: serde_json::from_value(self.genre_ids)?,
            release_date: self.release_date,
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            trailer_key: self.trailer_key,
            directors: serde_json::from_value(self.directors)?,
            writers: serde_json::from_value(self.writers)?,
            cast: serde_json::from_value(self.cast_members)?,
            homepage: self.homepage,
            tags: serde_json::from_value(self.tags)?,
            review_refs: self.review_refs.into_iter().map(ReviewId::from).collect(),
            rating_sum: self.rating_sum,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    owner_id: Uuid,
    owner_name: String,
    external_id: String,
    media_type: String,
    content: String,
    rating: i32,
    likes: Vec<Uuid>,
    dislikes: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReviewRow {
    fn into_review(self) -> Result<Review> {
        Ok(Review {
            id: ReviewId::from(self.id),
            owner_id: UserId::from(self.owner_id),
            owner_name: self.owner_name,
            external_id: self.external_id,
            media_type: parse_media_type(&self.media_type)?,
            content: self.content,
            rating: self.rating,
            likes: self.likes.into_iter().map(UserId::from).collect(),
            dislikes: self.dislikes.into_iter().map(UserId::from).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn parse_media_type(raw: &str) -> Result<MediaType> {
    raw.parse().map_err(|_| {
        CoreError::Consistency(format!("stored media type {raw:?} is not a known value"))
    })
}

fn review_refs_as_uuids(record: &MovieRecord) -> Vec<Uuid> {
    record.review_refs.iter().map(ReviewId::as_uuid).collect()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505")
}

/// Bind the mutable movie columns for [`UPDATE_MOVIE_SQL`].
fn movie_update_query(record: &MovieRecord) -> Result<Query<'static, Postgres, PgArguments>> {
    Ok(sqlx::query(UPDATE_MOVIE_SQL)
        .bind(record.id)
        .bind(record.title.clone())
        .bind(record.storyline.clone())
        .bind(record.runtime_minutes)
        .bind(serde_json::to_value(&record.languages)?)
        .bind(serde_json::to_value(&record.genre_ids)?)
        .bind(record.release_date)
        .bind(record.poster_path.clone())
        .bind(record.backdrop_path.clone())
        .bind(record.trailer_key.clone())
        .bind(serde_json::to_value(&record.directors)?)
        .bind(serde_json::to_value(&record.writers)?)
        .bind(serde_json::to_value(&record.cast)?)
        .bind(record.homepage.clone())
        .bind(serde_json::to_value(&record.tags)?)
        .bind(review_refs_as_uuids(record))
        .bind(record.rating_sum)
        .bind(record.updated_at))
}

/// Upsert one review row; add and update share this statement.
fn review_upsert_query(review: &Review) -> Query<'static, Postgres, PgArguments> {
    sqlx::query(
        r#"
        INSERT INTO reviews
            (id, owner_id, owner_name, external_id, media_type, content, rating,
             likes, dislikes, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (id) DO UPDATE SET
            content = EXCLUDED.content,
            rating = EXCLUDED.rating,
            likes = EXCLUDED.likes,
            dislikes = EXCLUDED.dislikes,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(review.id.as_uuid())
    .bind(review.owner_id.as_uuid())
    .bind(review.owner_name.clone())
    .bind(review.external_id.clone())
    .bind(review.media_type.as_str())
    .bind(review.content.clone())
    .bind(review.rating)
    .bind(review.likes.iter().map(UserId::as_uuid).collect::<Vec<_>>())
    .bind(
        review
            .dislikes
            .iter()
            .map(UserId::as_uuid)
            .collect::<Vec<_>>(),
    )
    .bind(review.created_at)
    .bind(review.updated_at)
}

#[async_trait]
impl MovieStore for PostgresMovieStore {
    async fn find_movie(
        &self,
        external_id: &str,
        media_type: MediaType,
    ) -> Result<Option<MovieRecord>> {
        let row: Option<MovieRow> = sqlx::query_as(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE external_id = $1 AND media_type = $2"
        ))
        .bind(external_id)
        .bind(media_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(MovieRow::into_record).transpose()
    }

    async fn insert_movie(&self, record: &MovieRecord) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO movies
                (id, external_id, media_type, title, storyline, runtime_minutes,
                 languages, genre_ids, release_date, poster_path, backdrop_path,
                 trailer_key, directors, writers, cast_members, homepage, tags,
                 review_refs, rating_sum, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19, $20, $21)
            ON CONFLICT (external_id, media_type) DO NOTHING
            "#,
        )
        .bind(record.id)
        .bind(record.external_id.clone())
        .bind(record.media_type.as_str())
        .bind(record.title.clone())
        .bind(record.storyline.clone())
        .bind(record.runtime_minutes)
        .bind(serde_json::to_value(&record.languages)?)
        .bind(serde_json::to_value(&record.genre_ids)?)
        .bind(record.release_date)
        .bind(record.poster_path.clone())
        .bind(record.backdrop_path.clone())
        .bind(record.trailer_key.clone())
        .bind(serde_json::to_value(&record.directors)?)
        .bind(serde_json::to_value(&record.writers)?)
        .bind(serde_json::to_value(&record.cast)?)
        .bind(record.homepage.clone())
        .bind(serde_json::to_value(&record.tags)?)
        .bind(review_refs_as_uuids(record))
        .bind(record.rating_sum)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::AlreadyCached)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn update_movie(&self, record: &MovieRecord) -> Result<()> {
        movie_update_query(record)?.execute(&self.pool).await?;
        Ok(())
    }

    async fn rated_movies(&self, media_type: MediaType) -> Result<Vec<RatingRow>> {
        let rows: Vec<(String, i64, i64)> = sqlx::query_as(
            r#"
            SELECT external_id, rating_sum, cardinality(review_refs)::BIGINT
            FROM movies
            WHERE media_type = $1 AND cardinality(review_refs) > 0
            "#,
        )
        .bind(media_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(external_id, rating_sum, review_count)| RatingRow {
                external_id,
                rating_sum,
                review_count,
            })
            .collect())
    }

    async fn find_review(&self, id: ReviewId) -> Result<Option<Review>> {
        let row: Option<ReviewRow> =
            sqlx::query_as("SELECT * FROM reviews WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        row.map(ReviewRow::into_review).transpose()
    }

    async fn find_review_by_owner(
        &self,
        owner: UserId,
        external_id: &str,
        media_type: MediaType,
    ) -> Result<Option<Review>> {
        let row: Option<ReviewRow> = sqlx::query_as(
            "SELECT * FROM reviews WHERE owner_id = $1 AND external_id = $2 AND media_type = $3",
        )
        .bind(owner.as_uuid())
        .bind(external_id)
        .bind(media_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ReviewRow::into_review).transpose()
    }

    async fn reviews_for_movie(
        &self,
        external_id: &str,
        media_type: MediaType,
    ) -> Result<Vec<Review>> {
        let rows: Vec<ReviewRow> = sqlx::query_as(
            "SELECT * FROM reviews WHERE external_id = $1 AND media_type = $2 ORDER BY created_at",
        )
        .bind(external_id)
        .bind(media_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ReviewRow::into_review).collect()
    }

    async fn persist_review(&self, movie: &MovieRecord, review: &Review) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        review_upsert_query(review)
            .execute(&mut *tx)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    CoreError::Consistency(format!(
                        "owner {} already reviewed {}/{}",
                        review.owner_id, review.media_type, review.external_id
                    ))
                } else {
                    CoreError::Database(err)
                }
            })?;

        movie_update_query(movie)?.execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_review(&self, movie: &MovieRecord, review: ReviewId) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review.as_uuid())
            .execute(&mut *tx)
            .await?;

        movie_update_query(movie)?.execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn save_review(&self, review: &Review) -> Result<()> {
        sqlx::query(
            "UPDATE reviews SET content = $2, rating = $3, likes = $4, dislikes = $5, updated_at = $6 WHERE id = $1",
        )
        .bind(review.id.as_uuid())
        .bind(review.content.clone())
        .bind(review.rating)
        .bind(review.likes.iter().map(UserId::as_uuid).collect::<Vec<_>>())
        .bind(
            review
                .dislikes
                .iter()
                .map(UserId::as_uuid)
                .collect::<Vec<_>>(),
        )
        .bind(review.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
