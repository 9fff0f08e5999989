use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Listing type as published by the catalog feed (`type` field).
///
/// Unknown values are preserved verbatim so filters can still match them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MovieKind {
    /// Feature film (`single`)
    Single,
    /// Multi-episode drama (`series`)
    Series,
    /// Animation (`hoathinh`)
    Animation,
    /// Television shows (`tvshows`)
    TvShows,
    /// Absent or empty type
    #[default]
    Unknown,
    Other(String),
}

impl MovieKind {
    pub fn as_str(&self) -> &str {
        match self {
            MovieKind::Single => "single",
            MovieKind::Series => "series",
            MovieKind::Animation => "hoathinh",
            MovieKind::TvShows => "tvshows",
            MovieKind::Unknown => "",
            MovieKind::Other(raw) => raw,
        }
    }

    /// Slug of the upstream listing that carries this kind, if there is one.
    pub fn list_slug(&self) -> Option<&'static str> {
        match self {
            MovieKind::Single => Some("phim-le"),
            MovieKind::Series => Some("phim-bo"),
            MovieKind::Animation => Some("hoat-hinh"),
            MovieKind::TvShows => Some("tv-shows"),
            MovieKind::Unknown | MovieKind::Other(_) => None,
        }
    }

    /// Case-insensitive comparison against a `type` filter value. Listing
    /// slugs (`phim-bo`, `phim-le`, ...) are accepted as aliases.
    pub fn matches(&self, filter: &str) -> bool {
        *self == MovieKind::from(filter)
    }
}

impl From<&str> for MovieKind {
    fn from(value: &str) -> Self {
        let normalized = value.trim().to_lowercase();
        match normalized.as_str() {
            "single" | "phim-le" => MovieKind::Single,
            "series" | "phim-bo" => MovieKind::Series,
            "hoathinh" | "hoat-hinh" => MovieKind::Animation,
            "tvshows" | "tv-shows" => MovieKind::TvShows,
            "" => MovieKind::Unknown,
            _ => MovieKind::Other(normalized),
        }
    }
}

impl From<String> for MovieKind {
    fn from(value: String) -> Self {
        MovieKind::from(value.as_str())
    }
}

impl From<MovieKind> for String {
    fn from(kind: MovieKind) -> Self {
        kind.as_str().to_string()
    }
}

impl Display for MovieKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_feed_values_and_list_slugs() {
        assert_eq!(MovieKind::from("series"), MovieKind::Series);
        assert_eq!(MovieKind::from("phim-bo"), MovieKind::Series);
        assert_eq!(MovieKind::from(" HoatHinh "), MovieKind::Animation);
        assert_eq!(MovieKind::from(""), MovieKind::Unknown);
        assert_eq!(
            MovieKind::from("Music"),
            MovieKind::Other("music".to_string())
        );
    }

    #[test]
    fn filter_matching_is_case_insensitive() {
        assert!(MovieKind::Single.matches("SINGLE"));
        assert!(MovieKind::Single.matches("phim-le"));
        assert!(!MovieKind::Single.matches("series"));
        assert!(MovieKind::Other("music".into()).matches("Music"));
        assert!(!MovieKind::Other("music".into()).matches("drama"));
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&MovieKind::TvShows).unwrap();
        assert_eq!(json, "\"tvshows\"");
    }
}
