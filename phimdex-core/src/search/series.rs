//! Series detection and grouping.
//!
//! Multi-part titles ("Show Phần 2", "Show Season 3", "Show 2") are reduced
//! to one representative per base title, the part with the highest number.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use phimdex_model::MovieRecord;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

const SERIES_KEYWORDS: &[&str] =
    &["tập", "season", "phần", "series", "bộ phim", "mùa", "episode"];

static EPISODE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(tập|episode|ep|part|phần|season|s)\s*\d+")
        .expect("episode marker pattern is valid")
});

static BRACKETED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\(\[\{][^\)\]\}]*[\)\]\}]")
        .expect("bracket pattern is valid")
});

/// Markers removed from a title, with their numbers, to form its base name.
static MARKERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(?:tập|episode|ep|part|phần|season|mùa)\s*\d+\b",
        r"(?i)\bs\d{1,2}(?:\s*e\d{1,4})?\b",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("marker pattern is valid"))
    .collect()
});

static TRAILING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+\d+\s*$").expect("trailing number pattern is valid")
});

static DANGLING_SEPARATORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\s\-–—:|,]+|[\s\-–—:|,]+$")
        .expect("separator pattern is valid")
});

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Part-number rules in order of preference; the first rule yielding a
/// positive number wins.
static PART_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("part", r"(?i)\b(?:phần|part)\s*(\d+)"),
        ("season", r"(?i)\b(?:season|mùa|s)\s*(\d+)"),
        ("episode", r"(?i)\b(?:tập|episode|ep)\s*(\d+)"),
        ("trailing_number", r"\s(\d+)\s*$"),
    ]
    .into_iter()
    .map(|(name, pattern)| {
        (name, Regex::new(pattern).expect("part pattern is valid"))
    })
    .collect()
});

/// What marked a record as part of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesSignal {
    Keyword,
    EpisodeMarker,
    EpisodeCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeriesClass {
    pub is_series: bool,
    pub signal: Option<SeriesSignal>,
}

impl SeriesClass {
    fn standalone() -> Self {
        Self {
            is_series: false,
            signal: None,
        }
    }

    fn series(signal: SeriesSignal) -> Self {
        Self {
            is_series: true,
            signal: Some(signal),
        }
    }
}

pub fn classify(record: &MovieRecord) -> SeriesClass {
    let titles = [record.name.as_str(), record.origin_name.as_str()];

    let has_keyword = titles.iter().any(|title| {
        let lowered = title.to_lowercase();
        SERIES_KEYWORDS
            .iter()
            .any(|keyword| lowered.contains(keyword))
    });
    if has_keyword {
        return SeriesClass::series(SeriesSignal::Keyword);
    }

    if titles.iter().any(|title| EPISODE_MARKER.is_match(title)) {
        return SeriesClass::series(SeriesSignal::EpisodeMarker);
    }

    if record.episode_total > 1 || record.episode_current > 1 {
        return SeriesClass::series(SeriesSignal::EpisodeCount);
    }

    SeriesClass::standalone()
}

/// Title with episode/part/season markers, bracketed annotations, trailing
/// numbers and dangling separators removed.
pub fn base_name(name: &str) -> String {
    let mut base = BRACKETED.replace_all(name, " ").into_owned();
    for marker in MARKERS.iter() {
        base = marker.replace_all(&base, " ").into_owned();
    }

    loop {
        let trimmed = DANGLING_SEPARATORS.replace_all(&base, "");
        let stripped = TRAILING_NUMBER.replace(&trimmed, "").into_owned();
        if stripped == base {
            break;
        }
        base = stripped;
    }

    WHITESPACE.replace_all(base.trim(), " ").into_owned()
}

/// Part number of a title; `1` when no rule yields a positive number.
pub fn part_number(name: &str) -> u32 {
    let cleaned = BRACKETED.replace_all(name, " ");
    for (rule, pattern) in PART_PATTERNS.iter() {
        let number = pattern
            .captures(&cleaned)
            .and_then(|captures| captures.get(1))
            .and_then(|digits| digits.as_str().parse::<u32>().ok())
            .filter(|number| *number > 0);

        if let Some(number) = number {
            debug!(rule, number, name, "Matched part number");
            return number;
        }
    }
    1
}

/// Grouping key: lower-cased base name, falling back to the original
/// name's base, then the slug.
fn group_key(record: &MovieRecord) -> String {
    [record.name.as_str(), record.origin_name.as_str()]
        .into_iter()
        .map(base_name)
        .find(|base| !base.is_empty())
        .unwrap_or_else(|| record.slug.clone())
        .to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesGroupEntry {
    pub base_name: String,
    pub latest: MovieRecord,
    pub part_number: u32,
}

/// Keeps standalone records and one representative (highest part) per
/// series. Output is standalone records in input order followed by the
/// representatives in order of first appearance.
pub fn group_latest_per_series(records: Vec<MovieRecord>) -> Vec<MovieRecord> {
    group_latest_by(records, |record| record)
}

/// [`group_latest_per_series`] over any item that carries a record.
pub(crate) fn group_latest_by<T, F>(items: Vec<T>, record_of: F) -> Vec<T>
where
    F: Fn(&T) -> &MovieRecord,
{
    let mut standalone = Vec::new();
    let mut groups: Vec<(u32, T)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let record = record_of(&item);
        if !classify(record).is_series {
            standalone.push(item);
            continue;
        }

        let key = group_key(record);
        let part = part_number(&record.name);
        match index.get(&key) {
            Some(&position) => {
                if part > groups[position].0 {
                    groups[position] = (part, item);
                }
            }
            None => {
                index.insert(key, groups.len());
                groups.push((part, item));
            }
        }
    }

    debug!(
        standalone = standalone.len(),
        series = groups.len(),
        "Grouped records by series"
    );

    standalone.extend(groups.into_iter().map(|(_, item)| item));
    standalone
}

/// Series grouping with the per-group detail exposed.
pub fn series_groups(records: &[MovieRecord]) -> Vec<SeriesGroupEntry> {
    let series: Vec<&MovieRecord> = records
        .iter()
        .filter(|record| classify(record).is_series)
        .collect();

    group_latest_by(series, |record| *record)
        .into_iter()
        .map(|record| SeriesGroupEntry {
            base_name: group_key(record),
            latest: record.clone(),
            part_number: part_number(&record.name),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_marker_and_counts_mark_series() {
        let keyword = MovieRecord::new("Show Phần 1", "show-1");
        let marker = MovieRecord::new("Loki S2", "loki-2");
        let counts = MovieRecord::new("Hạ Cánh Nơi Anh", "cloy")
            .with_episodes(16, 16);
        let movie = MovieRecord::new("Mắt Biếc", "mat-biec").with_episodes(1, 1);

        assert_eq!(classify(&keyword).signal, Some(SeriesSignal::Keyword));
        assert_eq!(classify(&marker).signal, Some(SeriesSignal::EpisodeMarker));
        assert_eq!(classify(&counts).signal, Some(SeriesSignal::EpisodeCount));
        assert!(!classify(&movie).is_series);
    }

    #[test]
    fn empty_record_is_standalone() {
        assert!(!classify(&MovieRecord::default()).is_series);
        assert_eq!(base_name(""), "");
        assert_eq!(part_number(""), 1);
    }

    #[test]
    fn base_name_strips_markers_wherever_they_sit() {
        assert_eq!(base_name("Tập 5 Game Of Thrones"), "Game Of Thrones");
        assert_eq!(base_name("Game Of Thrones Tập 5"), "Game Of Thrones");
        assert_eq!(base_name("Game Of Thrones 5"), "Game Of Thrones");
        assert_eq!(base_name("Show - Phần 2 (Lồng Tiếng)"), "Show");
        assert_eq!(base_name("Loki S02E03"), "Loki");
        assert_eq!(base_name("Mùa 3: Khu Vườn"), "Khu Vườn");
        assert_eq!(base_name("2012"), "2012");
    }

    #[test]
    fn part_number_prefers_part_markers() {
        assert_eq!(part_number("Phần 2"), 2);
        assert_eq!(part_number("Show Part 4 Tập 10"), 4);
        assert_eq!(part_number("Stranger Things Season 3"), 3);
        assert_eq!(part_number("Loki S2"), 2);
        assert_eq!(part_number("Naruto Tập 120"), 120);
        assert_eq!(part_number("Toy Story 4"), 4);
        assert_eq!(part_number("Show Phần 0 2"), 2);
        assert_eq!(part_number("No Numbers Here"), 1);
    }

    #[test]
    fn keeps_highest_part_per_series() {
        let records = vec![
            MovieRecord::new("Show Phần 1", "show-1"),
            MovieRecord::new("Mắt Biếc", "mat-biec"),
            MovieRecord::new("Show Phần 3", "show-3"),
            MovieRecord::new("Show Phần 2", "show-2"),
        ];

        let grouped = group_latest_per_series(records);
        let names: Vec<&str> = grouped.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Mắt Biếc", "Show Phần 3"]);
    }

    #[test]
    fn ties_keep_the_first_record() {
        let records = vec![
            MovieRecord::new("Show Phần 2", "first"),
            MovieRecord::new("show phần 2", "second"),
        ];
        let grouped = group_latest_per_series(records);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].slug, "first");
    }

    #[test]
    fn nameless_series_fall_back_to_slug_key() {
        let records = vec![
            MovieRecord::new("Phần 1", "alpha").with_episodes(2, 10),
            MovieRecord::new("Phần 2", "beta").with_episodes(2, 10),
        ];
        assert_eq!(group_latest_per_series(records).len(), 2);
    }

    #[test]
    fn groups_expose_base_name_and_part() {
        let records = vec![
            MovieRecord::new("Show Phần 1", "show-1"),
            MovieRecord::new("Show Phần 3", "show-3"),
        ];
        let groups = series_groups(&records);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].base_name, "show");
        assert_eq!(groups[0].part_number, 3);
        assert_eq!(groups[0].latest.slug, "show-3");
    }
}
