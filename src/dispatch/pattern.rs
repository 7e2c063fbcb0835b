//! Positional path patterns: `/user/$2/posts/$1`.
//!
//! A pattern is split on `/` into segments. A segment of the form `$<n>`, with
//! `n` a positive base-10 integer, captures the request segment at that
//! position as parameter `n`; every other segment must match literally.
//! Empty segments produced by leading or trailing slashes are kept, so
//! `/post` and `/post/` are different shapes.

use std::collections::BTreeMap;
use std::fmt;

/// One `/`-delimited component of a pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(usize),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        match param_index(raw) {
            Some(n) => Self::Param(n),
            None => Self::Literal(raw.to_owned()),
        }
    }
}

/// `$<n>` with `n >= 1`, otherwise `None`.
fn param_index(raw: &str) -> Option<usize> {
    let digits = raw.strip_prefix('$')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|&n| n > 0)
}

/// A parsed route pattern. The segment count is fixed once parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
}

impl Pattern {
    pub fn parse(source: &str) -> Self {
        Self {
            source: source.to_owned(),
            segments: source.split('/').map(Segment::parse).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Matches `path` segment by segment.
    ///
    /// Returns the captured values ordered by ascending parameter index, so
    /// `/user/$2/posts/$1` against `/user/alice/posts/7` yields
    /// `["7", "alice"]`. A path with a different segment count never matches.
    /// If an index appears twice the later capture wins.
    pub fn match_path(&self, path: &str) -> Option<Vec<String>> {
        let actual: Vec<&str> = path.split('/').collect();
        if actual.len() != self.segments.len() {
            return None;
        }

        let mut captured = BTreeMap::new();
        for (segment, value) in self.segments.iter().zip(actual) {
            match segment {
                Segment::Literal(lit) if lit == value => {}
                Segment::Literal(_) => return None,
                Segment::Param(n) => {
                    captured.insert(*n, value.to_owned());
                }
            }
        }
        Some(captured.into_values().collect())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tokens_and_literals() {
        let p = Pattern::parse("/post/$1/comment");
        assert_eq!(
            p.segments(),
            &[
                Segment::Literal(String::new()),
                Segment::Literal("post".into()),
                Segment::Param(1),
                Segment::Literal("comment".into()),
            ]
        );
    }

    #[test]
    fn non_tokens_stay_literal() {
        for raw in ["$", "$0", "$x", "$1a", "a$1", "$-1"] {
            assert_eq!(Segment::parse(raw), Segment::Literal(raw.into()), "{raw}");
        }
        assert_eq!(Segment::parse("$12"), Segment::Param(12));
    }

    #[test]
    fn matches_literal_paths() {
        let p = Pattern::parse("/post");
        assert_eq!(p.match_path("/post"), Some(vec![]));
        assert_eq!(p.match_path("/posts"), None);
    }

    #[test]
    fn captures_single_parameter() {
        let p = Pattern::parse("/post/$1");
        assert_eq!(p.match_path("/post/42"), Some(vec!["42".to_owned()]));
    }

    #[test]
    fn orders_parameters_by_index() {
        let p = Pattern::parse("/user/$2/posts/$1");
        assert_eq!(
            p.match_path("/user/alice/posts/7"),
            Some(vec!["7".to_owned(), "alice".to_owned()])
        );
    }

    #[test]
    fn segment_count_must_be_equal() {
        let p = Pattern::parse("/post/$1");
        assert_eq!(p.match_path("/post/42/comment"), None);
        assert_eq!(p.match_path("/post"), None);
        assert_eq!(p.match_path("/post/42/"), None);
    }

    #[test]
    fn empty_segments_are_kept() {
        let p = Pattern::parse("/post/");
        assert_eq!(p.match_path("/post/"), Some(vec![]));
        assert_eq!(p.match_path("/post"), None);

        // a trailing slash is an empty capture, not a missing one
        let p = Pattern::parse("/post/$1");
        assert_eq!(p.match_path("/post/"), Some(vec![String::new()]));
    }

    #[test]
    fn token_equal_to_its_own_text_is_still_captured() {
        let p = Pattern::parse("/post/$1");
        assert_eq!(p.match_path("/post/$1"), Some(vec!["$1".to_owned()]));
    }

    #[test]
    fn repeated_index_keeps_last_capture() {
        let p = Pattern::parse("/$1/$1");
        assert_eq!(p.match_path("/a/b"), Some(vec!["b".to_owned()]));
    }
}
