use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{CastMember, GenreCount, Movie, ReviewStats, WatchStats},
};

use super::{ListFilter, MovieStore, SearchFilter};

const MOVIE_COLUMNS: &str =
    "m.id, m.title, m.director, m.cast_members, m.genres, m.rating, m.release_year, m.watch_count, m.poster_url";

/// Creates a PostgreSQL connection pool
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Escapes `LIKE` wildcards so user text only ever matches literally
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `ILIKE` pattern for the coarse text filter, or `None` to skip it.
///
/// `ILIKE` only folds non-ASCII case when the database's `LC_CTYPE` knows
/// how, so a non-ASCII query is left entirely to the strict pass.
pub fn coarse_pattern(text: &str) -> Option<String> {
    text.is_ascii().then(|| format!("%{}%", escape_like(text)))
}

#[derive(Debug, FromRow)]
struct MovieRow {
    id: Uuid,
    title: String,
    director: Option<String>,
    cast_members: Json<Vec<CastMember>>,
    genres: Vec<String>,
    rating: f64,
    release_year: Option<i32>,
    watch_count: i64,
    poster_url: Option<String>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            title: row.title,
            director: row.director,
            cast: row.cast_members.0,
            genres: row.genres,
            rating: row.rating,
            release_year: row.release_year,
            watch_count: row.watch_count,
            poster_url: row.poster_url,
        }
    }
}

#[derive(Debug, FromRow)]
struct WatchStatsRow {
    movie_id: Uuid,
    title: String,
    poster_url: Option<String>,
    rating: f64,
    genres: Vec<String>,
    release_year: Option<i32>,
    watch_count: i64,
    total_duration: i64,
    unique_viewers: i64,
}

impl From<WatchStatsRow> for WatchStats {
    fn from(row: WatchStatsRow) -> Self {
        WatchStats {
            movie_id: row.movie_id,
            title: row.title,
            poster_url: row.poster_url,
            rating: row.rating,
            genres: row.genres,
            release_year: row.release_year,
            watch_count: row.watch_count,
            total_duration: row.total_duration,
            unique_viewers: row.unique_viewers,
        }
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// `MovieStore` backed by PostgreSQL
#[derive(Clone)]
pub struct PgMovieStore {
    pool: PgPool,
}

impl PgMovieStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MovieStore for PgMovieStore {
    async fn search_candidates(&self, filter: &SearchFilter) -> AppResult<Vec<Movie>> {
        let pattern = coarse_pattern(&filter.text);

        let sql = format!(
            r#"
            SELECT {MOVIE_COLUMNS}
            FROM movies m
            WHERE (
                $1::TEXT IS NULL
                OR m.title ILIKE $1 ESCAPE '\'
                OR m.director ILIKE $1 ESCAPE '\'
                OR EXISTS (
                    SELECT 1 FROM jsonb_array_elements(m.cast_members) AS c
                    WHERE c->>'name' ILIKE $1 ESCAPE '\'
                )
            )
            AND ($2::TEXT IS NULL OR EXISTS (
                SELECT 1 FROM unnest(m.genres) AS g(genre) WHERE lower(g.genre) = lower($2)
            ))
            AND ($3::DOUBLE PRECISION IS NULL OR m.rating >= $3)
            ORDER BY m.title, m.id
            "#
        );

        let rows: Vec<MovieRow> = sqlx::query_as(&sql)
            .bind(pattern.as_deref())
            .bind(filter.genre.as_deref())
            .bind(filter.min_rating)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(candidates = rows.len(), "Fetched search candidates");

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn find_movie(&self, id: Uuid) -> AppResult<Option<Movie>> {
        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies m WHERE m.id = $1");

        let row: Option<MovieRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Movie::from))
    }

    async fn list_movies(
        &self,
        filter: &ListFilter,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<Movie>> {
        let sql = format!(
            r#"
            SELECT {MOVIE_COLUMNS}
            FROM movies m
            WHERE ($1::TEXT IS NULL OR EXISTS (
                SELECT 1 FROM unnest(m.genres) AS g(genre) WHERE lower(g.genre) = lower($1)
            ))
            AND ($2::DOUBLE PRECISION IS NULL OR m.rating >= $2)
            ORDER BY m.rating DESC, m.watch_count DESC, m.id
            OFFSET $3
            LIMIT $4
            "#
        );

        let rows: Vec<MovieRow> = sqlx::query_as(&sql)
            .bind(filter.genre.as_deref())
            .bind(filter.min_rating)
            .bind(to_i64(skip))
            .bind(to_i64(limit))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn count_movies(&self, filter: &ListFilter) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM movies m
            WHERE ($1::TEXT IS NULL OR EXISTS (
                SELECT 1 FROM unnest(m.genres) AS g(genre) WHERE lower(g.genre) = lower($1)
            ))
            AND ($2::DOUBLE PRECISION IS NULL OR m.rating >= $2)
            "#,
        )
        .bind(filter.genre.as_deref())
        .bind(filter.min_rating)
        .fetch_one(&self.pool)
        .await?;

        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn genre_counts_for_user(&self, user_id: Uuid) -> AppResult<Vec<GenreCount>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT g.genre, COUNT(*)
            FROM watch_history w
            JOIN movies m ON m.id = w.movie_id
            CROSS JOIN LATERAL unnest(m.genres) AS g(genre)
            WHERE w.user_id = $1
            GROUP BY g.genre
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(genre, count)| GenreCount { genre, count })
            .collect())
    }

    async fn watched_movie_ids(&self, user_id: Uuid) -> AppResult<HashSet<Uuid>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT DISTINCT movie_id FROM watch_history WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids.into_iter().collect())
    }

    async fn watch_stats_since(&self, since: DateTime<Utc>) -> AppResult<Vec<WatchStats>> {
        let rows: Vec<WatchStatsRow> = sqlx::query_as(
            r#"
            SELECT
                m.id AS movie_id,
                m.title,
                m.poster_url,
                m.rating,
                m.genres,
                m.release_year,
                COUNT(*) AS watch_count,
                COALESCE(SUM(w.watch_duration), 0)::BIGINT AS total_duration,
                COUNT(DISTINCT w.user_id) AS unique_viewers
            FROM watch_history w
            JOIN movies m ON m.id = w.movie_id
            WHERE w.watched_at >= $1
            GROUP BY m.id
            ORDER BY m.id
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(WatchStats::from).collect())
    }

    async fn review_stats(&self, movie_id: Uuid) -> AppResult<Option<ReviewStats>> {
        let (average_rating, total_reviews): (Option<f64>, i64) = sqlx::query_as(
            r#"
            SELECT AVG(rating)::DOUBLE PRECISION, COUNT(*)
            FROM reviews
            WHERE movie_id = $1
            "#,
        )
        .bind(movie_id)
        .fetch_one(&self.pool)
        .await?;

        if total_reviews == 0 {
            return Ok(None);
        }

        Ok(Some(ReviewStats {
            average_rating: average_rating.unwrap_or_default(),
            total_reviews,
        }))
    }
}
