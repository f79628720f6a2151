//! Derived, per-request views built on top of stored movies.

use serde::Serialize;
use uuid::Uuid;

use super::{CastMember, Movie, ReviewStats};

/// Score components rounded for display
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ScoreSummary {
    pub text: f64,
    pub rating: f64,
    pub popularity: f64,
}

/// A cast credit with its highlighted name, when the name matched
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CastHighlight {
    #[serde(flatten)]
    pub member: CastMember,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_highlighted: Option<String>,
}

/// A search hit: the movie copy plus its ranking and highlight annotations
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoredMovie {
    #[serde(flatten)]
    pub movie: Movie,
    pub hybrid_score: f64,
    pub score_breakdown: ScoreSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_highlighted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director_highlighted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cast_highlighted: Option<Vec<CastHighlight>>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

/// One page of an ordered sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub movies: Vec<ScoredMovie>,
    pub pagination: Pagination,
}

/// Listing response body
#[derive(Debug, Clone, Serialize)]
pub struct MovieList {
    pub movies: Vec<Movie>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendingEntry {
    pub id: Uuid,
    pub title: String,
    pub poster_url: Option<String>,
    pub rating: f64,
    pub genres: Vec<String>,
    pub release_year: Option<i32>,
    pub watch_count: i64,
    pub unique_viewers: i64,
    pub avg_watch_time: i64,
    pub genre_match: u8,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendingResults {
    pub trending: Vec<TrendingEntry>,
    pub period: String,
    pub personalized: bool,
    pub user_favorite_genre: Option<String>,
    pub filtered_out_watched: usize,
}

/// A movie together with its review aggregate
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetail {
    #[serde(flatten)]
    pub movie: Movie,
    pub review_stats: ReviewStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scored_movie_omits_unmatched_highlights() {
        let scored = ScoredMovie {
            movie: Movie {
                id: Uuid::nil(),
                title: "Inception".to_string(),
                director: Some("Christopher Nolan".to_string()),
                cast: vec![],
                genres: vec![],
                rating: 8.8,
                release_year: Some(2010),
                watch_count: 3,
                poster_url: None,
            },
            hybrid_score: 0.61,
            score_breakdown: ScoreSummary {
                text: 0.6,
                rating: 0.88,
                popularity: 0.15,
            },
            title_highlighted: None,
            director_highlighted: Some("Christopher <mark>Nolan</mark>".to_string()),
            cast_highlighted: None,
        };

        let value = serde_json::to_value(&scored).unwrap();
        assert_eq!(value["title"], "Inception");
        assert_eq!(value["hybridScore"], 0.61);
        assert_eq!(value["scoreBreakdown"]["rating"], 0.88);
        assert!(value.get("titleHighlighted").is_none());
        assert!(value.get("castHighlighted").is_none());
        assert_eq!(value["directorHighlighted"], "Christopher <mark>Nolan</mark>");
    }

    #[test]
    fn test_movie_detail_flattens_movie() {
        let detail = MovieDetail {
            movie: Movie {
                id: Uuid::nil(),
                title: "Heat".to_string(),
                director: None,
                cast: vec![],
                genres: vec![],
                rating: 8.3,
                release_year: None,
                watch_count: 0,
                poster_url: None,
            },
            review_stats: ReviewStats::default(),
        };

        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["title"], "Heat");
        assert_eq!(value["reviewStats"]["averageRating"], 0.0);
        assert_eq!(value["reviewStats"]["totalReviews"], 0);
    }
}
