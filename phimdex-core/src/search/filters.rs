use std::str::FromStr;

use phimdex_model::{MovieKind, MovieRecord, Taxon};
use serde::{Deserialize, Serialize};

/// Listing filters plus optional sort override.
///
/// Empty strings behave like absent filters.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterSet {
    pub category: Option<String>,
    pub country: Option<String>,
    pub year: Option<u32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub sort: Option<SortKey>,
    #[serde(rename = "sortType")]
    pub order: Option<SortOrder>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        active(&self.category).is_none()
            && active(&self.country).is_none()
            && self.year.is_none()
            && active(&self.kind).is_none()
    }

    pub fn matches(&self, record: &MovieRecord) -> bool {
        if let Some(category) = active(&self.category)
            && !matches_taxa(&record.category, category)
        {
            return false;
        }
        if let Some(country) = active(&self.country)
            && !matches_taxa(&record.country, country)
        {
            return false;
        }
        if let Some(year) = self.year
            && record.year != year
        {
            return false;
        }
        if let Some(kind) = active(&self.kind)
            && !record.kind.matches(kind)
        {
            return false;
        }
        true
    }

    /// Parsed `type` filter, if any.
    pub fn movie_kind(&self) -> Option<MovieKind> {
        active(&self.kind).map(MovieKind::from)
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Slug equality or case-insensitive name containment.
fn matches_taxa(taxa: &[Taxon], wanted: &str) -> bool {
    let wanted_lower = wanted.to_lowercase();
    taxa.iter().any(|taxon| {
        taxon.slug.eq_ignore_ascii_case(wanted)
            || (!taxon.name.is_empty()
                && taxon.name.to_lowercase().contains(&wanted_lower))
    })
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Relevance,
    Year,
    Name,
    Modified,
}

impl FromStr for SortKey {
    type Err = UnknownSortValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "relevance" | "score" => Ok(SortKey::Relevance),
            "year" => Ok(SortKey::Year),
            "name" | "title" => Ok(SortKey::Name),
            "modified" | "modified.time" | "updated" => Ok(SortKey::Modified),
            _ => Err(UnknownSortValue(value.to_string())),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortOrder {
    type Err = UnknownSortValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            _ => Err(UnknownSortValue(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort value: {0}")]
pub struct UnknownSortValue(pub String);

pub const DEFAULT_PAGE_LIMIT: usize = 24;

/// 1-based page request. Construction normalizes out-of-range values:
/// page 0 becomes 1 and the limit is at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Pagination {
    page: usize,
    limit: usize,
}

impl Pagination {
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Clamps the limit to `max_limit` (itself at least 1).
    pub fn capped(self, max_limit: usize) -> Self {
        Self::new(self.page, self.limit.min(max_limit.max(1)))
    }

    pub fn total_pages(&self, total_items: usize) -> usize {
        total_items.div_ceil(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_LIMIT)
    }
}
