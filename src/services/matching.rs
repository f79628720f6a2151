//! Case-insensitive literal matching over the searchable movie fields.
//!
//! The same matcher decides strict inclusion, the title/director sort keys
//! and where highlight markers go, so the three can never disagree.

use std::ops::Range;

use crate::models::Movie;

pub const HIGHLIGHT_OPEN: &str = "<mark>";
pub const HIGHLIGHT_CLOSE: &str = "</mark>";

/// A search query folded to lowercase once per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Needle {
    raw: String,
    folded: Vec<char>,
}

/// Which searchable fields of a movie contain the query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldMatches {
    pub title: bool,
    pub director: bool,
    pub cast: bool,
}

impl FieldMatches {
    pub fn any(&self) -> bool {
        self.title || self.director || self.cast
    }
}

impl Needle {
    pub fn new(query: &str) -> Self {
        Self {
            raw: query.to_string(),
            folded: query.chars().flat_map(char::to_lowercase).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }

    /// True when the folded haystack equals the folded query
    pub fn equals(&self, haystack: &str) -> bool {
        !self.is_empty() && self.match_len_at(haystack, 0) == Some(haystack.len())
    }

    pub fn is_prefix_of(&self, haystack: &str) -> bool {
        self.match_len_at(haystack, 0).is_some()
    }

    pub fn matches(&self, haystack: &str) -> bool {
        self.find(haystack, 0).is_some()
    }

    pub fn match_movie(&self, movie: &Movie) -> FieldMatches {
        FieldMatches {
            title: self.matches(&movie.title),
            director: movie.director.as_deref().is_some_and(|d| self.matches(d)),
            cast: movie.cast.iter().any(|member| self.matches(&member.name)),
        }
    }

    /// Wraps every non-overlapping occurrence in highlight markers.
    ///
    /// Returns `None` when the query does not occur at all.
    pub fn highlight(&self, haystack: &str) -> Option<String> {
        let mut found = self.find(haystack, 0)?;
        let mut out = String::with_capacity(haystack.len() + 16);
        let mut cursor = 0;

        loop {
            out.push_str(&haystack[cursor..found.start]);
            out.push_str(HIGHLIGHT_OPEN);
            out.push_str(&haystack[found.clone()]);
            out.push_str(HIGHLIGHT_CLOSE);
            cursor = found.end;

            match self.find(haystack, cursor) {
                Some(next) => found = next,
                None => break,
            }
        }

        out.push_str(&haystack[cursor..]);
        Some(out)
    }

    /// First occurrence at or after byte offset `from` (a char boundary)
    fn find(&self, haystack: &str, from: usize) -> Option<Range<usize>> {
        if self.is_empty() {
            return None;
        }
        haystack[from..].char_indices().find_map(|(offset, _)| {
            let start = from + offset;
            self.match_len_at(haystack, start)
                .map(|len| start..start + len)
        })
    }

    /// Byte length of a match beginning at `start`, if the query matches there.
    /// A match must end on a character boundary of the haystack.
    fn match_len_at(&self, haystack: &str, start: usize) -> Option<usize> {
        let mut expected = self.folded.iter();
        let mut next = expected.next()?;

        for (offset, c) in haystack[start..].char_indices() {
            let mut lowered = c.to_lowercase().peekable();
            while let Some(lower) = lowered.next() {
                if *next != lower {
                    return None;
                }
                match expected.next() {
                    Some(following) => next = following,
                    None if lowered.peek().is_none() => return Some(offset + c.len_utf8()),
                    None => return None,
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CastMember;
    use uuid::Uuid;

    fn movie(title: &str, director: Option<&str>, cast: &[&str]) -> Movie {
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
            genres: vec![],
            rating: 7.0,
            release_year: None,
            watch_count: 0,
            poster_url: None,
        }
    }

    #[test]
    fn test_matches_ignores_case() {
        let needle = Needle::new("nOLAn");
        assert!(needle.matches("Christopher Nolan"));
        assert!(!needle.matches("Nola"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let needle = Needle::new("a.c");
        assert!(!needle.matches("abc"));
        assert!(needle.matches("xa.cx"));

        let needle = Needle::new("(");
        assert!(needle.matches("Birdman (or The Unexpected Virtue)"));
    }

    #[test]
    fn test_empty_needle_matches_nothing() {
        let needle = Needle::new("");
        assert!(needle.is_empty());
        assert!(!needle.matches("anything"));
        assert_eq!(needle.highlight("anything"), None);
    }

    #[test]
    fn test_equals_and_prefix() {
        let needle = Needle::new("heat");
        assert!(needle.equals("Heat"));
        assert!(!needle.equals("Heat 2"));
        assert!(needle.is_prefix_of("Heat 2"));
        assert!(!needle.is_prefix_of("The Heat"));
    }

    #[test]
    fn test_highlight_wraps_every_occurrence_preserving_case() {
        let needle = Needle::new("the");
        assert_eq!(
            needle.highlight("The Others in the Theatre").as_deref(),
            Some("<mark>The</mark> O<mark>the</mark>rs in <mark>the</mark> <mark>The</mark>atre")
        );
    }

    #[test]
    fn test_highlight_occurrences_do_not_overlap() {
        let needle = Needle::new("aa");
        assert_eq!(
            needle.highlight("aaa").as_deref(),
            Some("<mark>aa</mark>a")
        );
    }

    #[test]
    fn test_highlight_handles_multibyte_text() {
        let needle = Needle::new("amélie");
        assert_eq!(
            needle.highlight("Le Fabuleux Destin d'AMÉLIE Poulain").as_deref(),
            Some("Le Fabuleux Destin d'<mark>AMÉLIE</mark> Poulain")
        );
    }

    #[test]
    fn test_partial_character_expansion_is_not_a_match() {
        // 'İ' lowercases to "i\u{307}"; a bare "i" must not match half of it
        let needle = Needle::new("i");
        assert!(!needle.matches("İ"));
        assert!(Needle::new("i\u{307}").matches("İ"));
    }

    #[test]
    fn test_match_movie_reports_each_field() {
        let needle = Needle::new("nolan");
        let by_director = movie("Inception", Some("Christopher Nolan"), &["Leonardo DiCaprio"]);
        assert_eq!(
            needle.match_movie(&by_director),
            FieldMatches {
                title: false,
                director: true,
                cast: false
            }
        );

        let by_cast = movie("Interstellar", None, &["Matthew McConaughey", "Nolan North"]);
        let matches = needle.match_movie(&by_cast);
        assert!(matches.cast);
        assert!(!matches.director);
        assert!(matches.any());

        let none = movie("Heat", None, &[]);
        assert!(!needle.match_movie(&none).any());
    }
}
