//! Personalized trending movies.
//!
//! Watch events from the trailing window are grouped per movie, titles the
//! user has already watched are dropped, and movies in the user's favorite
//! genre are ranked ahead of the rest.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
    db::MovieStore,
    error::{AppError, AppResult},
    models::{GenreCount, TrendingEntry, TrendingResults, WatchStats},
};

pub const TRENDING_WINDOW_DAYS: i64 = 30;
pub const TRENDING_LIMIT: usize = 5;
pub const TRENDING_PERIOD: &str = "Last 30 days";

/// What is known about the requesting user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserTaste {
    pub favorite_genre: Option<String>,
    pub watched: HashSet<Uuid>,
}

/// Parses the optional `userId` parameter. An empty value counts as absent.
pub fn parse_user_id(raw: Option<&str>) -> AppResult<Option<Uuid>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Uuid::parse_str(value)
            .map(Some)
            .map_err(|_| AppError::InvalidInput(format!("Invalid userId: {}", value))),
    }
}

/// Highest count wins; equal counts go to the alphabetically first genre
pub fn favorite_genre(counts: &[GenreCount]) -> Option<String> {
    counts
        .iter()
        .max_by(|a, b| a.count.cmp(&b.count).then_with(|| b.genre.cmp(&a.genre)))
        .map(|top| top.genre.clone())
}

pub async fn load_user_taste(store: &dyn MovieStore, user_id: Uuid) -> AppResult<UserTaste> {
    let (genre_counts, watched) = tokio::try_join!(
        store.genre_counts_for_user(user_id),
        store.watched_movie_ids(user_id)
    )?;

    Ok(UserTaste {
        favorite_genre: favorite_genre(&genre_counts),
        watched,
    })
}

pub async fn trending_movies(
    store: &dyn MovieStore,
    user_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> AppResult<TrendingResults> {
    let taste = match user_id {
        Some(user_id) => load_user_taste(store, user_id).await?,
        None => UserTaste::default(),
    };

    let since = now - Duration::days(TRENDING_WINDOW_DAYS);
    let stats = store.watch_stats_since(since).await?;
    let window_size = stats.len();

    let (trending, filtered_out_watched) = rank_trending(stats, &taste);

    tracing::info!(
        personalized = user_id.is_some(),
        favorite_genre = ?taste.favorite_genre,
        window_movies = window_size,
        filtered_out_watched,
        returned = trending.len(),
        "Computed trending movies"
    );

    Ok(TrendingResults {
        trending,
        period: TRENDING_PERIOD.to_string(),
        personalized: user_id.is_some(),
        user_favorite_genre: taste.favorite_genre,
        filtered_out_watched,
    })
}

/// Annotates, excludes watched movies, sorts and truncates.
/// Returns the top entries and how many were dropped as already watched.
pub fn rank_trending(stats: Vec<WatchStats>, taste: &UserTaste) -> (Vec<TrendingEntry>, usize) {
    let total = stats.len();

    let mut entries: Vec<TrendingEntry> = stats
        .into_iter()
        .filter(|s| !taste.watched.contains(&s.movie_id))
        .map(|s| to_entry(s, taste.favorite_genre.as_deref()))
        .collect();
    let filtered_out = total - entries.len();

    entries.sort_by(|a, b| {
        b.genre_match
            .cmp(&a.genre_match)
            .then(b.watch_count.cmp(&a.watch_count))
    });
    entries.truncate(TRENDING_LIMIT);

    (entries, filtered_out)
}

fn to_entry(stats: WatchStats, favorite_genre: Option<&str>) -> TrendingEntry {
    let genre_match =
        favorite_genre.is_some_and(|favorite| stats.genres.iter().any(|g| g == favorite));

    TrendingEntry {
        avg_watch_time: average_watch_time(stats.total_duration, stats.watch_count),
        id: stats.movie_id,
        title: stats.title,
        poster_url: stats.poster_url,
        rating: stats.rating,
        genres: stats.genres,
        release_year: stats.release_year,
        watch_count: stats.watch_count,
        unique_viewers: stats.unique_viewers,
        genre_match: u8::from(genre_match),
    }
}

/// `round(total / count)`, halves rounding to even
pub fn average_watch_time(total_duration: i64, watch_count: i64) -> i64 {
    if watch_count <= 0 {
        return 0;
    }
    (total_duration as f64 / watch_count as f64).round_ties_even() as i64
}
