//! Hybrid relevance scoring.
//!
//! A search hit is scored from three signals, each normalized to [0, 1]:
//! how strongly the query matches the searchable text, the movie's rating
//! and its watch-count popularity. The final score is their weighted sum.

use crate::models::{Movie, ScoreSummary};

use super::matching::Needle;

const TITLE_EXACT: f64 = 1.0;
const TITLE_PREFIX: f64 = 0.9;
const TITLE_CONTAINS: f64 = 0.8;
const DIRECTOR_CONTAINS: f64 = 0.6;
const CAST_CONTAINS: f64 = 0.5;
/// Ceiling for queries that only match word by word
const PARTIAL_WORDS: f64 = 0.4;

/// Relative weight of each signal. Callers keep the sum at 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub similarity: f64,
    pub rating: f64,
    pub popularity: f64,
}

/// Weights used by movie search
pub const SEARCH_WEIGHTS: ScoreWeights = ScoreWeights {
    similarity: 0.5,
    rating: 0.3,
    popularity: 0.2,
};

/// Deployment-wide normalization constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringConfig {
    /// Upper bound of the rating scale
    pub rating_scale: f64,
    /// Watch count mapped to a popularity of 1.0
    pub popularity_saturation: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            rating_scale: 10.0,
            popularity_saturation: 10_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridScore {
    pub text: f64,
    pub rating: f64,
    pub popularity: f64,
    pub total: f64,
}

impl HybridScore {
    /// Components rounded to two decimals for display
    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary {
            text: round2(self.text),
            rating: round2(self.rating),
            popularity: round2(self.popularity),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn score(
    movie: &Movie,
    query: &Needle,
    weights: &ScoreWeights,
    config: &ScoringConfig,
) -> HybridScore {
    let text = text_score(movie, query);
    let rating = rating_score(movie.rating, config.rating_scale);
    let popularity = popularity_score(movie.watch_count, config.popularity_saturation);

    HybridScore {
        text,
        rating,
        popularity,
        total: weights.similarity * text + weights.rating * rating + weights.popularity * popularity,
    }
}

/// Strength of the textual match, best field wins
pub fn text_score(movie: &Movie, query: &Needle) -> f64 {
    if query.is_empty() {
        return 0.0;
    }

    if query.equals(&movie.title) {
        return TITLE_EXACT;
    }
    if query.is_prefix_of(&movie.title) {
        return TITLE_PREFIX;
    }

    let matches = query.match_movie(movie);
    if matches.title {
        TITLE_CONTAINS
    } else if matches.director {
        DIRECTOR_CONTAINS
    } else if matches.cast {
        CAST_CONTAINS
    } else {
        PARTIAL_WORDS * word_coverage(movie, query.as_str())
    }
}

/// Fraction of the query's words found in any searchable field
fn word_coverage(movie: &Movie, query: &str) -> f64 {
    let words: Vec<Needle> = query.split_whitespace().map(Needle::new).collect();
    if words.is_empty() {
        return 0.0;
    }

    let found = words
        .iter()
        .filter(|word| word.match_movie(movie).any())
        .count();

    found as f64 / words.len() as f64
}

pub fn rating_score(rating: f64, scale: f64) -> f64 {
    if !rating.is_finite() || scale <= 0.0 {
        return 0.0;
    }
    (rating / scale).clamp(0.0, 1.0)
}

/// Logarithmic curve reaching 1.0 at `saturation` watches
pub fn popularity_score(watch_count: i64, saturation: f64) -> f64 {
    if watch_count <= 0 || saturation <= 0.0 {
        return 0.0;
    }
    ((watch_count as f64).ln_1p() / saturation.ln_1p()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CastMember;
    use uuid::Uuid;

    fn movie(title: &str, director: Option<&str>, cast: &[&str], rating: f64, watches: i64) -> Movie {
        Movie {
            id: Uuid::new_v4(),
            title: title.to_string(),
            director: director.map(str::to_string),
            cast: cast
                .iter()
                .map(|name| CastMember {
                    name: name.to_string(),
                    role: None,
                })
                .collect(),
            genres: vec!["Drama".to_string()],
            rating,
            release_year: Some(2000),
            watch_count: watches,
            poster_url: None,
        }
    }

    #[test]
    fn test_text_score_ranks_match_strength() {
        let query = Needle::new("heat");
        let exact = text_score(&movie("Heat", None, &[], 8.0, 0), &query);
        let prefix = text_score(&movie("Heat Wave", None, &[], 8.0, 0), &query);
        let contains = text_score(&movie("The Heat", None, &[], 8.0, 0), &query);
        let director = text_score(&movie("Other", Some("Heather Lee"), &[], 8.0, 0), &query);
        let cast = text_score(&movie("Other", None, &["Heath Ledger"], 8.0, 0), &query);
        let none = text_score(&movie("Other", None, &[], 8.0, 0), &query);

        assert!(exact > prefix);
        assert!(prefix > contains);
        assert!(contains > director);
        assert!(director > cast);
        assert!(cast > none);
        assert_eq!(none, 0.0);
    }

    #[test]
    fn test_text_score_partial_words() {
        let query = Needle::new("dark knight rises again");
        let score = text_score(&movie("The Dark Knight", None, &[], 9.0, 0), &query);
        assert!((score - PARTIAL_WORDS * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_missing_director_degrades_to_zero() {
        let query = Needle::new("nolan");
        let score = text_score(&movie("Memento", None, &[], 8.4, 0), &query);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_rating_score_normalizes_and_clamps() {
        assert_eq!(rating_score(8.0, 10.0), 0.8);
        assert_eq!(rating_score(4.0, 5.0), 0.8);
        assert_eq!(rating_score(12.0, 10.0), 1.0);
        assert_eq!(rating_score(-1.0, 10.0), 0.0);
        assert_eq!(rating_score(f64::NAN, 10.0), 0.0);
    }

    #[test]
    fn test_popularity_is_monotonic_and_saturates() {
        let saturation = 10_000.0;
        assert_eq!(popularity_score(0, saturation), 0.0);
        assert_eq!(popularity_score(-5, saturation), 0.0);

        let low = popularity_score(10, saturation);
        let mid = popularity_score(1_000, saturation);
        assert!(low < mid);
        assert!(mid < 1.0);
        assert_eq!(popularity_score(10_000, saturation), 1.0);
        assert_eq!(popularity_score(1_000_000, saturation), 1.0);
    }

    #[test]
    fn test_final_score_is_weighted_sum() {
        let candidate = movie("Heat", Some("Michael Mann"), &[], 8.0, 10_000);
        let result = score(
            &candidate,
            &Needle::new("heat"),
            &SEARCH_WEIGHTS,
            &ScoringConfig::default(),
        );

        assert_eq!(result.text, 1.0);
        assert_eq!(result.rating, 0.8);
        assert_eq!(result.popularity, 1.0);
        assert!((result.total - (0.5 + 0.3 * 0.8 + 0.2)).abs() < 1e-9);
    }

    #[test]
    fn test_score_is_deterministic() {
        let candidate = movie("Inception", Some("Christopher Nolan"), &["Elliot Page"], 8.8, 321);
        let query = Needle::new("nolan");
        let config = ScoringConfig::default();
        let first = score(&candidate, &query, &SEARCH_WEIGHTS, &config);
        let second = score(&candidate, &query, &SEARCH_WEIGHTS, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_summary_rounds_to_two_decimals() {
        let summary = HybridScore {
            text: 0.6,
            rating: 0.876,
            popularity: 0.1234,
            total: 0.0,
        }
        .summary();
        assert_eq!(summary.rating, 0.88);
        assert_eq!(summary.popularity, 0.12);
    }
}
