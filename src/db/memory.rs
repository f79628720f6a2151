//! In-process `MovieStore` holding plain vectors.
//!
//! Mirrors the ordering and grouping rules of the Postgres queries so the
//! service layer and the HTTP surface can be exercised without a database.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{GenreCount, Movie, Review, ReviewStats, WatchEvent, WatchStats},
    services::matching::Needle,
};

use super::{ListFilter, MovieStore, SearchFilter};

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    movies: Vec<Movie>,
    watch_history: Vec<WatchEvent>,
    reviews: Vec<Review>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_movies(mut self, movies: impl IntoIterator<Item = Movie>) -> Self {
        self.movies.extend(movies);
        self
    }

    pub fn with_watch_events(mut self, events: impl IntoIterator<Item = WatchEvent>) -> Self {
        self.watch_history.extend(events);
        self
    }

    pub fn with_reviews(mut self, reviews: impl IntoIterator<Item = Review>) -> Self {
        self.reviews.extend(reviews);
        self
    }

    fn movie(&self, id: Uuid) -> Option<&Movie> {
        self.movies.iter().find(|movie| movie.id == id)
    }

    fn listing(&self, filter: &ListFilter) -> Vec<&Movie> {
        let mut movies: Vec<&Movie> = self.movies.iter().filter(|m| filter.matches(m)).collect();
        movies.sort_by(|a, b| {
            b.rating
                .total_cmp(&a.rating)
                .then(b.watch_count.cmp(&a.watch_count))
                .then(a.id.cmp(&b.id))
        });
        movies
    }
}

#[derive(Default)]
struct Tally {
    watch_count: i64,
    total_duration: i64,
    viewers: HashSet<Uuid>,
}

#[async_trait]
impl MovieStore for InMemoryStore {
    async fn search_candidates(&self, filter: &SearchFilter) -> AppResult<Vec<Movie>> {
        let needle = Needle::new(&filter.text);
        let list_filter = ListFilter {
            genre: filter.genre.clone(),
            min_rating: filter.min_rating,
        };

        let mut candidates: Vec<Movie> = self
            .movies
            .iter()
            .filter(|movie| needle.match_movie(movie).any() && list_filter.matches(movie))
            .cloned()
            .collect();
        candidates.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));

        Ok(candidates)
    }

    async fn find_movie(&self, id: Uuid) -> AppResult<Option<Movie>> {
        Ok(self.movie(id).cloned())
    }

    async fn list_movies(
        &self,
        filter: &ListFilter,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<Movie>> {
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(self
            .listing(filter)
            .into_iter()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_movies(&self, filter: &ListFilter) -> AppResult<u64> {
        Ok(self.movies.iter().filter(|m| filter.matches(m)).count() as u64)
    }

    async fn genre_counts_for_user(&self, user_id: Uuid) -> AppResult<Vec<GenreCount>> {
        let mut counts: HashMap<&str, i64> = HashMap::new();

        for event in self.watch_history.iter().filter(|e| e.user_id == user_id) {
            if let Some(movie) = self.movie(event.movie_id) {
                for genre in &movie.genres {
                    *counts.entry(genre.as_str()).or_default() += 1;
                }
            }
        }

        Ok(counts
            .into_iter()
            .map(|(genre, count)| GenreCount {
                genre: genre.to_string(),
                count,
            })
            .collect())
    }

    async fn watched_movie_ids(&self, user_id: Uuid) -> AppResult<HashSet<Uuid>> {
        Ok(self
            .watch_history
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.movie_id)
            .collect())
    }

    async fn watch_stats_since(&self, since: DateTime<Utc>) -> AppResult<Vec<WatchStats>> {
        let mut tallies: BTreeMap<Uuid, Tally> = BTreeMap::new();

        for event in self.watch_history.iter().filter(|e| e.timestamp >= since) {
            let tally = tallies.entry(event.movie_id).or_default();
            tally.watch_count += 1;
            tally.total_duration += event.watch_duration;
            tally.viewers.insert(event.user_id);
        }

        Ok(tallies
            .into_iter()
            .filter_map(|(movie_id, tally)| {
                let movie = self.movie(movie_id)?;
                Some(WatchStats {
                    movie_id,
                    title: movie.title.clone(),
                    poster_url: movie.poster_url.clone(),
                    rating: movie.rating,
                    genres: movie.genres.clone(),
                    release_year: movie.release_year,
                    watch_count: tally.watch_count,
                    total_duration: tally.total_duration,
                    unique_viewers: tally.viewers.len() as i64,
                })
            })
            .collect())
    }

    async fn review_stats(&self, movie_id: Uuid) -> AppResult<Option<ReviewStats>> {
        let ratings: Vec<f64> = self
            .reviews
            .iter()
            .filter(|r| r.movie_id == movie_id)
            .map(|r| r.rating)
            .collect();

        if ratings.is_empty() {
            return Ok(None);
        }

        Ok(Some(ReviewStats {
            average_rating: ratings.iter().sum::<f64>() / ratings.len() as f64,
            total_reviews: ratings.len() as i64,
        }))
    }
}
