use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{GenreCount, Movie, ReviewStats, WatchStats},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::{create_pool, run_migrations, PgMovieStore};

/// Coarse search predicate. `text` is matched literally, never compiled into
/// a pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    pub text: String,
    pub genre: Option<String>,
    pub min_rating: Option<f64>,
}

/// Listing predicate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    pub genre: Option<String>,
    pub min_rating: Option<f64>,
}

impl ListFilter {
    pub fn matches(&self, movie: &Movie) -> bool {
        self.genre
            .as_deref()
            .map_or(true, |genre| movie.has_genre_ignore_case(genre))
            && self.min_rating.map_or(true, |min| movie.rating >= min)
    }
}

/// Read-only access to the movie catalog, the watch log and reviews
///
/// Every orchestrator goes through this trait, so the ranking logic runs the
/// same against Postgres and against the in-memory store used by tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieStore: Send + Sync {
    /// Movies whose title, director or a cast name contain `filter.text`
    /// (case-insensitive), ordered by title then id.
    async fn search_candidates(&self, filter: &SearchFilter) -> AppResult<Vec<Movie>>;

    async fn find_movie(&self, id: Uuid) -> AppResult<Option<Movie>>;

    /// One slice of the catalog ordered by rating, then watch count (both
    /// descending), then id
    async fn list_movies(&self, filter: &ListFilter, skip: u64, limit: u64)
        -> AppResult<Vec<Movie>>;

    async fn count_movies(&self, filter: &ListFilter) -> AppResult<u64>;

    /// Number of the user's watch events per genre of the watched movie
    async fn genre_counts_for_user(&self, user_id: Uuid) -> AppResult<Vec<GenreCount>>;

    async fn watched_movie_ids(&self, user_id: Uuid) -> AppResult<HashSet<Uuid>>;

    /// Watch events at or after `since`, grouped per existing movie and
    /// ordered by movie id
    async fn watch_stats_since(&self, since: DateTime<Utc>) -> AppResult<Vec<WatchStats>>;

    /// `None` when the movie has no reviews
    async fn review_stats(&self, movie_id: Uuid) -> AppResult<Option<ReviewStats>>;
}
