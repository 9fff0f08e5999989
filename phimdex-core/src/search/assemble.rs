//! Filter, dedupe, score, sort, group and paginate candidate records.

use std::cmp::Ordering;
use std::collections::HashMap;

use phimdex_model::MovieRecord;
use serde::Serialize;
use tracing::debug;

use crate::search::filters::{FilterSet, Pagination, SortKey, SortOrder};
use crate::search::normalize::collation_key;
use crate::search::scoring::{ScoredCandidate, ScoringEngine};
use crate::search::series::group_latest_by;

/// One page of assembled results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembledPage {
    pub items: Vec<MovieRecord>,
    pub total_items: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub per_page: usize,
}

impl AssembledPage {
    pub fn is_empty(&self) -> bool {
        self.total_items == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResultAssembler {
    engine: ScoringEngine,
}

impl ResultAssembler {
    pub fn new(engine: ScoringEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn assemble(
        &self,
        records: Vec<MovieRecord>,
        keyword: &str,
        filters: &FilterSet,
        pagination: Pagination,
    ) -> AssembledPage {
        let ranked = self.rank(records, keyword, filters);
        paginate(ranked, pagination)
    }

    /// Like [`ResultAssembler::assemble`], but multi-part series collapse to
    /// their latest part before sorting and pagination.
    pub fn assemble_series_grouped(
        &self,
        records: Vec<MovieRecord>,
        keyword: &str,
        filters: &FilterSet,
        pagination: Pagination,
    ) -> AssembledPage {
        let scored = self.score_all(records, keyword, filters);
        let grouped = group_latest_by(scored, |candidate| &candidate.record);
        let sorted = sort_candidates(grouped, has_keyword(keyword), filters);
        paginate(sorted, pagination)
    }

    /// Every matching record in final order, scores included.
    pub fn rank(
        &self,
        records: Vec<MovieRecord>,
        keyword: &str,
        filters: &FilterSet,
    ) -> Vec<ScoredCandidate> {
        let scored = self.score_all(records, keyword, filters);
        sort_candidates(scored, has_keyword(keyword), filters)
    }

    fn score_all(
        &self,
        records: Vec<MovieRecord>,
        keyword: &str,
        filters: &FilterSet,
    ) -> Vec<ScoredCandidate> {
        let received = records.len();
        let filtered: Vec<MovieRecord> = records
            .into_iter()
            .filter(|record| filters.matches(record))
            .collect();
        let filtered_count = filtered.len();
        let unique = dedup_by_slug(filtered);
        let unique_count = unique.len();

        let prepared = self.engine.prepare(keyword);
        let scored: Vec<ScoredCandidate> = unique
            .iter()
            .map(|record| {
                self.engine.score_detailed_prepared(prepared.as_ref(), record)
            })
            .filter(ScoredCandidate::is_match)
            .collect();

        debug!(
            keyword,
            received,
            filtered = filtered_count,
            unique = unique_count,
            matched = scored.len(),
            "Scored candidates"
        );
        scored
    }
}

/// Convenience wrapper over a default [`ResultAssembler`].
pub fn assemble(
    records: Vec<MovieRecord>,
    keyword: &str,
    filters: &FilterSet,
    pagination: Pagination,
) -> AssembledPage {
    ResultAssembler::default().assemble(records, keyword, filters, pagination)
}

fn has_keyword(keyword: &str) -> bool {
    !keyword.trim().is_empty()
}

/// Collapses records sharing a slug. The last value wins but keeps the
/// position of the first occurrence. Empty slugs never collapse.
pub(crate) fn dedup_by_slug(records: Vec<MovieRecord>) -> Vec<MovieRecord> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<MovieRecord> = Vec::with_capacity(records.len());

    for record in records {
        if record.slug.is_empty() {
            unique.push(record);
            continue;
        }
        match positions.get(&record.slug) {
            Some(&position) => unique[position] = record,
            None => {
                positions.insert(record.slug.clone(), unique.len());
                unique.push(record);
            }
        }
    }
    unique
}

struct SortEntry {
    collation: String,
    candidate: ScoredCandidate,
}

fn sort_candidates(
    candidates: Vec<ScoredCandidate>,
    keyword_present: bool,
    filters: &FilterSet,
) -> Vec<ScoredCandidate> {
    let key = filters.sort.unwrap_or(if keyword_present {
        SortKey::Relevance
    } else {
        SortKey::Year
    });
    let order = filters.order.unwrap_or(match key {
        SortKey::Name => SortOrder::Asc,
        SortKey::Relevance | SortKey::Year | SortKey::Modified => {
            SortOrder::Desc
        }
    });

    let mut entries: Vec<SortEntry> = candidates
        .into_iter()
        .map(|candidate| SortEntry {
            collation: collation_key(&candidate.record.name),
            candidate,
        })
        .collect();

    entries.sort_by(|a, b| compare(a, b, key, order));
    entries.into_iter().map(|entry| entry.candidate).collect()
}

/// Primary key in the requested order; tie-breaks are fixed: year
/// descending, then name ascending.
fn compare(
    a: &SortEntry,
    b: &SortEntry,
    key: SortKey,
    order: SortOrder,
) -> Ordering {
    let (ra, rb) = (&a.candidate.record, &b.candidate.record);
    let by_name = || {
        a.collation
            .cmp(&b.collation)
            .then_with(|| ra.name.cmp(&rb.name))
    };
    let by_year_desc = || rb.year.cmp(&ra.year);

    match key {
        SortKey::Relevance => order
            .apply(
                a.candidate
                    .relevance_score
                    .total_cmp(&b.candidate.relevance_score),
            )
            .then_with(by_year_desc)
            .then_with(by_name),
        SortKey::Year => order.apply(ra.year.cmp(&rb.year)).then_with(by_name),
        SortKey::Name => order.apply(by_name()).then_with(by_year_desc),
        SortKey::Modified => order
            .apply(ra.modified.cmp(&rb.modified))
            .then_with(by_year_desc)
            .then_with(by_name),
    }
}

fn paginate(
    candidates: Vec<ScoredCandidate>,
    pagination: Pagination,
) -> AssembledPage {
    let total_items = candidates.len();
    let items = candidates
        .into_iter()
        .skip(pagination.offset())
        .take(pagination.limit())
        .map(|candidate| candidate.record)
        .collect();

    AssembledPage {
        items,
        total_items,
        total_pages: pagination.total_pages(total_items),
        current_page: pagination.page(),
        per_page: pagination.limit(),
    }
}
