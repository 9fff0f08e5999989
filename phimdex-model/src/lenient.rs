//! Forgiving field decoders for the catalog feed.
//!
//! The upstream feed is inconsistent about field types: years arrive as
//! numbers or strings, episode counts as free text (`"Tập 12"`,
//! `"Hoàn Tất (16/16)"`), cast lists as arrays or comma separated strings.
//! Every decoder here is total: anything it cannot interpret becomes the
//! empty value instead of failing the whole record.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

use crate::movie::Taxon;

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(text) => text,
            Scalar::Unsigned(n) => n.to_string(),
            Scalar::Signed(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(_) | Scalar::Other(_) => String::new(),
        }
    }

    fn into_number(self) -> u32 {
        match self {
            Scalar::Unsigned(n) => u32::try_from(n).unwrap_or(u32::MAX),
            Scalar::Signed(n) => u32::try_from(n.max(0)).unwrap_or(u32::MAX),
            Scalar::Float(n) if n.is_finite() && n >= 0.0 => {
                n.min(f64::from(u32::MAX)) as u32
            }
            Scalar::Text(text) => first_number(&text),
            Scalar::Float(_) | Scalar::Bool(_) | Scalar::Other(_) => 0,
        }
    }
}

/// First run of ASCII digits in `text`, or `0` when there is none. Runs
/// too large for `u32` saturate to `u32::MAX`.
pub fn first_number(text: &str) -> u32 {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return 0;
    }
    digits
        .parse::<u64>()
        .map_or(u32::MAX, |n| u32::try_from(n).unwrap_or(u32::MAX))
}

pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_text)
        .unwrap_or_default())
}

pub fn number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_number)
        .unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrText {
    List(Vec<Option<Scalar>>),
    Text(String),
    Other(IgnoredAny),
}

/// A list of names, or a single comma separated string of names.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<ListOrText>::deserialize(deserializer)?;
    let names: Vec<String> = match raw {
        Some(ListOrText::List(items)) => items
            .into_iter()
            .flatten()
            .map(Scalar::into_text)
            .collect(),
        Some(ListOrText::Text(text)) => {
            text.split(',').map(str::to_string).collect()
        }
        Some(ListOrText::Other(_)) | None => Vec::new(),
    };

    Ok(names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TaxonLike {
    Full(Taxon),
    Name(String),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TaxaLike {
    List(Vec<TaxonLike>),
    Single(TaxonLike),
}

/// Category/country terms: a list of `{name, slug}` objects, bare names, or
/// a single term.
pub fn taxa<'de, D>(deserializer: D) -> Result<Vec<Taxon>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Option::<TaxaLike>::deserialize(deserializer)? {
        Some(TaxaLike::List(items)) => items,
        Some(TaxaLike::Single(item)) => vec![item],
        None => Vec::new(),
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            TaxonLike::Full(taxon) => Some(taxon),
            TaxonLike::Name(name) => Some(Taxon::new(name, "")),
            TaxonLike::Other(_) => None,
        })
        .filter(|taxon| !(taxon.name.is_empty() && taxon.slug.is_empty()))
        .collect())
}

/// Lenient conversion for enum-like string fields.
pub fn string_into<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    string(deserializer).map(T::from)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Timestamp {
    Text(String),
    Stamped { time: Option<String> },
    Other(IgnoredAny),
}

/// Modification time: an RFC 3339 string, a `"%Y-%m-%d %H:%M:%S"` string,
/// or the feed's `{ "time": ... }` wrapper.
pub fn modified<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Option::<Timestamp>::deserialize(deserializer)? {
        Some(Timestamp::Text(text)) => Some(text),
        Some(Timestamp::Stamped { time }) => time,
        Some(Timestamp::Other(_)) | None => None,
    };
    Ok(text.as_deref().and_then(parse_timestamp))
}

pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}
