use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::kind::MovieKind;
use crate::lenient;

/// A category or country term attached to a movie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Taxon {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub slug: String,
}

impl Taxon {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
        }
    }
}

/// One catalog entry as synced from the upstream feed.
///
/// Serialized with camelCase keys; the feed's snake_case keys and singular
/// `actor`/`director` keys are accepted on input. Every field decodes
/// leniently (see [`crate::lenient`]), so a record never fails to load
/// because of a malformed field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(
        default,
        alias = "origin_name",
        deserialize_with = "lenient::string"
    )]
    pub origin_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub slug: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub year: u32,
    #[serde(default, deserialize_with = "lenient::taxa")]
    pub category: Vec<Taxon>,
    #[serde(default, deserialize_with = "lenient::taxa")]
    pub country: Vec<Taxon>,
    #[serde(
        default,
        alias = "episode_current",
        deserialize_with = "lenient::number"
    )]
    pub episode_current: u32,
    #[serde(
        default,
        alias = "episode_total",
        deserialize_with = "lenient::number"
    )]
    pub episode_total: u32,
    #[serde(
        default,
        rename = "actors",
        alias = "actor",
        deserialize_with = "lenient::string_list"
    )]
    pub actors: Vec<String>,
    #[serde(
        default,
        rename = "directors",
        alias = "director",
        deserialize_with = "lenient::string_list"
    )]
    pub directors: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub content: String,
    #[serde(
        default,
        rename = "type",
        deserialize_with = "lenient::string_into"
    )]
    pub kind: MovieKind,
    #[serde(default, alias = "poster_url", deserialize_with = "lenient::string")]
    pub poster_url: String,
    #[serde(default, alias = "thumb_url", deserialize_with = "lenient::string")]
    pub thumb_url: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub quality: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub lang: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub time: String,
    #[serde(
        default,
        deserialize_with = "lenient::modified",
        skip_serializing_if = "Option::is_none"
    )]
    pub modified: Option<DateTime<Utc>>,
}

impl MovieRecord {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            ..Self::default()
        }
    }

    pub fn with_origin_name(mut self, origin_name: impl Into<String>) -> Self {
        self.origin_name = origin_name.into();
        self
    }

    pub fn with_year(mut self, year: u32) -> Self {
        self.year = year;
        self
    }

    pub fn with_category(mut self, name: &str, slug: &str) -> Self {
        self.category.push(Taxon::new(name, slug));
        self
    }

    pub fn with_country(mut self, name: &str, slug: &str) -> Self {
        self.country.push(Taxon::new(name, slug));
        self
    }

    pub fn with_episodes(mut self, current: u32, total: u32) -> Self {
        self.episode_current = current;
        self.episode_total = total;
        self
    }

    pub fn with_actors<I, S>(mut self, actors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actors = actors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_directors<I, S>(mut self, directors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.directors = directors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_kind(mut self, kind: MovieKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_feed_record_with_snake_case_keys() {
        let raw = json!({
            "_id": "abc",
            "name": "Hạ Cánh Nơi Anh",
            "origin_name": "Crash Landing on You",
            "slug": "ha-canh-noi-anh",
            "year": "2019",
            "type": "series",
            "episode_current": "Hoàn Tất (16/16)",
            "episode_total": "16 Tập",
            "category": [{"id": "1", "name": "Tình Cảm", "slug": "tinh-cam"}],
            "country": [{"id": "2", "name": "Hàn Quốc", "slug": "han-quoc"}],
            "actor": ["Hyun Bin", "Son Ye Jin"],
            "director": "Lee Jung Hyo",
            "poster_url": "upload/vod/poster.jpg",
            "modified": {"time": "2024-05-01T10:00:00.000Z"}
        });

        let record: MovieRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.origin_name, "Crash Landing on You");
        assert_eq!(record.year, 2019);
        assert_eq!(record.kind, MovieKind::Series);
        assert_eq!(record.episode_current, 16);
        assert_eq!(record.episode_total, 16);
        assert_eq!(record.category, vec![Taxon::new("Tình Cảm", "tinh-cam")]);
        assert_eq!(record.actors, vec!["Hyun Bin", "Son Ye Jin"]);
        assert_eq!(record.directors, vec!["Lee Jung Hyo"]);
        assert_eq!(record.poster_url, "upload/vod/poster.jpg");
        assert!(record.modified.is_some());
    }

    #[test]
    fn malformed_fields_degrade_to_empty_values() {
        let raw = json!({
            "name": null,
            "slug": "x",
            "year": "unknown",
            "episode_current": "Full",
            "episode_total": null,
            "category": "Hành Động",
            "country": null,
            "actor": "Tom Hanks, , Meg Ryan",
            "director": [null, "Nora Ephron"],
            "type": 7,
            "modified": [1, 2]
        });

        let record: MovieRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.name, "");
        assert_eq!(record.year, 0);
        assert_eq!(record.episode_current, 0);
        assert_eq!(record.episode_total, 0);
        assert_eq!(record.category, vec![Taxon::new("Hành Động", "")]);
        assert!(record.country.is_empty());
        assert_eq!(record.actors, vec!["Tom Hanks", "Meg Ryan"]);
        assert_eq!(record.directors, vec!["Nora Ephron"]);
        assert_eq!(record.kind, MovieKind::Other("7".to_string()));
        assert!(record.modified.is_none());
    }

    #[test]
    fn absent_fields_take_defaults() {
        let record: MovieRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record, MovieRecord::default());
    }

    #[test]
    fn serializes_camel_case_keys() {
        let record = MovieRecord::new("Mắt Biếc", "mat-biec")
            .with_origin_name("Dreamy Eyes")
            .with_episodes(1, 1);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["originName"], "Dreamy Eyes");
        assert_eq!(value["episodeTotal"], 1);
        assert_eq!(value["type"], "");
        assert!(value.get("modified").is_none());

        let back: MovieRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
