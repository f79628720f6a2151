use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    db::ListFilter,
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{MovieDetail, MovieList, SearchResults, TrendingResults},
    services::{
        catalog,
        pagination::PageRequest,
        search::{self, SearchRequest},
        trending,
    },
};

use super::{AppState, Envelope};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    query: Option<String>,
    genre: Option<String>,
    min_rating: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    genre: Option<String>,
    min_rating: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingParams {
    user_id: Option<String>,
}

/// Blank values count as absent
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_min_rating(raw: Option<String>) -> AppResult<Option<f64>> {
    match non_blank(raw) {
        None => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .ok()
            .filter(|rating| rating.is_finite())
            .map(Some)
            .ok_or_else(|| AppError::InvalidInput(format!("Invalid minRating: {}", value))),
    }
}

/// Handler for movie search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Envelope<SearchResults>>> {
    let page = PageRequest::from_raw(
        params.page.as_deref(),
        params.limit.as_deref(),
        state.page_defaults.search_limit,
    );
    let request = SearchRequest::new(
        params.query.as_deref(),
        non_blank(params.genre),
        parse_min_rating(params.min_rating)?,
        page,
    )?;

    tracing::info!(
        request_id = %request_id,
        query = %request.query,
        genre = ?request.genre,
        min_rating = ?request.min_rating,
        page = page.page,
        limit = page.limit,
        "Processing search request"
    );

    let results = search::search_movies(state.store.as_ref(), &request, &state.scoring).await?;

    Ok(Envelope::ok(results))
}

/// Handler for personalized trending movies
pub async fn trending(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<TrendingParams>,
) -> AppResult<Json<Envelope<TrendingResults>>> {
    let user_id = trending::parse_user_id(params.user_id.as_deref())?;

    tracing::info!(
        request_id = %request_id,
        personalized = user_id.is_some(),
        "Processing trending request"
    );

    let results = trending::trending_movies(state.store.as_ref(), user_id, Utc::now()).await?;

    Ok(Envelope::ok(results))
}

#[derive(Debug, Serialize)]
pub struct MovieBody {
    movie: MovieDetail,
}

/// Handler for a single movie with review stats
pub async fn get_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Envelope<MovieBody>>> {
    let id = catalog::parse_movie_id(&id)?;
    let movie = catalog::get_movie(state.store.as_ref(), id).await?;

    Ok(Envelope::ok(MovieBody { movie }))
}

/// Handler for the paginated catalog listing
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Envelope<MovieList>>> {
    let page = PageRequest::from_raw(
        params.page.as_deref(),
        params.limit.as_deref(),
        state.page_defaults.list_limit,
    );
    let filter = ListFilter {
        genre: non_blank(params.genre),
        min_rating: parse_min_rating(params.min_rating)?,
    };

    let list = catalog::list_movies(state.store.as_ref(), &filter, page).await?;

    tracing::debug!(
        returned = list.movies.len(),
        total = list.pagination.total,
        "Listed movies"
    );

    Ok(Envelope::ok(list))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_min_rating() {
        assert_eq!(parse_min_rating(None).unwrap(), None);
        assert_eq!(parse_min_rating(Some(" ".to_string())).unwrap(), None);
        assert_eq!(parse_min_rating(Some("7.5".to_string())).unwrap(), Some(7.5));
        assert!(parse_min_rating(Some("high".to_string())).is_err());
        assert!(parse_min_rating(Some("NaN".to_string())).is_err());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  Drama ".to_string())).as_deref(), Some("Drama"));
        assert_eq!(non_blank(Some(String::new())), None);
        assert_eq!(non_blank(None), None);
    }
}
