use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod ranked;

pub use ranked::{
    CastHighlight, MovieDetail, MovieList, Page, Pagination, ScoreSummary, ScoredMovie,
    SearchResults, TrendingEntry, TrendingResults,
};

/// A cast credit on a movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// A movie as stored in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub rating: f64,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub watch_count: i64,
    #[serde(default)]
    pub poster_url: Option<String>,
}

impl Movie {
    /// Whether the movie carries `genre`, ignoring case
    pub fn has_genre_ignore_case(&self, genre: &str) -> bool {
        let genre = genre.to_lowercase();
        self.genres.iter().any(|g| g.to_lowercase() == genre)
    }
}

/// One entry of the append-only watch log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchEvent {
    pub user_id: Uuid,
    pub movie_id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Seconds watched
    pub watch_duration: i64,
}

/// A user review; only the rating takes part in aggregates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub movie_id: Uuid,
    pub rating: f64,
}

/// Average rating and number of reviews for one movie
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub average_rating: f64,
    pub total_reviews: i64,
}

/// How often a user's watch history touched a genre
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreCount {
    pub genre: String,
    pub count: i64,
}

/// Watch activity for one movie inside the trending window, joined to the
/// movie's static attributes
#[derive(Debug, Clone, PartialEq)]
pub struct WatchStats {
    pub movie_id: Uuid,
    pub title: String,
    pub poster_url: Option<String>,
    pub rating: f64,
    pub genres: Vec<String>,
    pub release_year: Option<i32>,
    pub watch_count: i64,
    pub total_duration: i64,
    pub unique_viewers: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_deserializes_with_missing_optional_fields() {
        let json = r#"{
            "id": "6f1c2a8e-4b7d-4c39-9a65-2d0d9f3b1c11",
            "title": "Inception",
            "rating": 8.8
        }"#;
        let movie: Movie = serde_json::from_str(json).unwrap();
        assert_eq!(movie.title, "Inception");
        assert_eq!(movie.director, None);
        assert!(movie.cast.is_empty());
        assert_eq!(movie.watch_count, 0);
    }

    #[test]
    fn test_movie_serializes_camel_case() {
        let movie = Movie {
            id: Uuid::nil(),
            title: "Heat".to_string(),
            director: Some("Michael Mann".to_string()),
            cast: vec![CastMember {
                name: "Al Pacino".to_string(),
                role: Some("Vincent Hanna".to_string()),
            }],
            genres: vec!["Crime".to_string()],
            rating: 8.3,
            release_year: Some(1995),
            watch_count: 12,
            poster_url: None,
        };
        let value = serde_json::to_value(&movie).unwrap();
        assert_eq!(value["releaseYear"], 1995);
        assert_eq!(value["watchCount"], 12);
        assert_eq!(value["cast"][0]["role"], "Vincent Hanna");
    }

    #[test]
    fn test_has_genre_ignore_case() {
        let movie = Movie {
            id: Uuid::nil(),
            title: "Alien".to_string(),
            director: None,
            cast: vec![],
            genres: vec!["Sci-Fi".to_string(), "Horror".to_string()],
            rating: 8.5,
            release_year: None,
            watch_count: 0,
            poster_url: None,
        };
        assert!(movie.has_genre_ignore_case("sci-fi"));
        assert!(movie.has_genre_ignore_case("HORROR"));
        assert!(!movie.has_genre_ignore_case("Sci"));
    }
}
