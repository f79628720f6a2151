use uuid::Uuid;

use crate::{
    db::{ListFilter, MovieStore},
    error::{AppError, AppResult},
    models::{MovieDetail, MovieList},
};

use super::pagination::PageRequest;

pub fn parse_movie_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::InvalidInput(format!("Invalid movie id: {}", raw)))
}

/// Fetches one movie with its review aggregate
pub async fn get_movie(store: &dyn MovieStore, id: Uuid) -> AppResult<MovieDetail> {
    let movie = store
        .find_movie(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Movie not found".to_string()))?;

    let review_stats = store.review_stats(id).await?.unwrap_or_default();

    tracing::debug!(
        movie_id = %id,
        total_reviews = review_stats.total_reviews,
        "Loaded movie detail"
    );

    Ok(MovieDetail {
        movie,
        review_stats,
    })
}

/// One page of the catalog, best rated first
pub async fn list_movies(
    store: &dyn MovieStore,
    filter: &ListFilter,
    page: PageRequest,
) -> AppResult<MovieList> {
    let (movies, total) = tokio::try_join!(
        store.list_movies(filter, page.skip(), u64::from(page.limit.max(1))),
        store.count_movies(filter)
    )?;

    Ok(MovieList {
        movies,
        pagination: page.pagination(total),
    })
}
