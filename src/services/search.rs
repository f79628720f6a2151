//! Movie search with hybrid ranking and match highlighting.

use std::cmp::Ordering;

use crate::{
    db::{MovieStore, SearchFilter},
    error::{AppError, AppResult},
    models::{CastHighlight, Movie, ScoredMovie, SearchResults},
};

use super::{
    matching::{FieldMatches, Needle},
    pagination::{paginate, PageRequest},
    scoring::{self, HybridScore, ScoringConfig, SEARCH_WEIGHTS},
};

/// A validated search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub genre: Option<String>,
    pub min_rating: Option<f64>,
    pub page: PageRequest,
}

impl SearchRequest {
    /// Rejects a missing or empty query. The query is kept verbatim,
    /// whitespace included, so every hit contains it as typed.
    pub fn new(
        query: Option<&str>,
        genre: Option<String>,
        min_rating: Option<f64>,
        page: PageRequest,
    ) -> AppResult<Self> {
        let query = query.unwrap_or_default();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query is required".to_string(),
            ));
        }

        Ok(Self {
            query: query.to_string(),
            genre,
            min_rating,
            page,
        })
    }
}

/// A candidate that survived the strict pass, with its sort keys
struct Ranked {
    movie: Movie,
    matches: FieldMatches,
    score: HybridScore,
}

pub async fn search_movies(
    store: &dyn MovieStore,
    request: &SearchRequest,
    scoring_config: &ScoringConfig,
) -> AppResult<SearchResults> {
    let filter = SearchFilter {
        text: request.query.clone(),
        genre: request.genre.clone(),
        min_rating: request.min_rating,
    };

    let candidates = store.search_candidates(&filter).await?;
    let candidate_count = candidates.len();

    let needle = Needle::new(&request.query);
    let ranked = rank(candidates, &needle, scoring_config);

    tracing::info!(
        query = %request.query,
        candidates = candidate_count,
        matched = ranked.len(),
        "Ranked search results"
    );

    let highlighted: Vec<ScoredMovie> = ranked
        .into_iter()
        .map(|entry| annotate(entry, &needle))
        .collect();

    let page = paginate(highlighted, request.page);

    Ok(SearchResults {
        movies: page.data,
        pagination: page.pagination,
    })
}

/// Strict substring pass, scoring and the three-key stable sort
fn rank(candidates: Vec<Movie>, needle: &Needle, config: &ScoringConfig) -> Vec<Ranked> {
    let mut ranked: Vec<Ranked> = candidates
        .into_iter()
        .filter_map(|movie| {
            let matches = needle.match_movie(&movie);
            if !matches.any() {
                return None;
            }
            let score = scoring::score(&movie, needle, &SEARCH_WEIGHTS, config);
            Some(Ranked {
                movie,
                matches,
                score,
            })
        })
        .collect();

    ranked.sort_by(compare_ranked);
    ranked
}

fn compare_ranked(a: &Ranked, b: &Ranked) -> Ordering {
    b.matches
        .title
        .cmp(&a.matches.title)
        .then(b.matches.director.cmp(&a.matches.director))
        .then(b.score.total.total_cmp(&a.score.total))
}

fn annotate(entry: Ranked, needle: &Needle) -> ScoredMovie {
    let Ranked {
        movie,
        matches,
        score,
    } = entry;

    let title_highlighted = matches
        .title
        .then(|| needle.highlight(&movie.title))
        .flatten();
    let director_highlighted = movie
        .director
        .as_deref()
        .filter(|_| matches.director)
        .and_then(|director| needle.highlight(director));
    let cast_highlighted = matches.cast.then(|| {
        movie
            .cast
            .iter()
            .map(|member| CastHighlight {
                member: member.clone(),
                name_highlighted: needle.highlight(&member.name),
            })
            .collect()
    });

    ScoredMovie {
        hybrid_score: score.total,
        score_breakdown: score.summary(),
        title_highlighted,
        director_highlighted,
        cast_highlighted,
        movie,
    }
}
