//! Relevance search: scoring, synonym expansion, series grouping and result
//! assembly.

pub mod assemble;
pub mod facets;
pub mod filters;
pub mod normalize;
pub mod scoring;
pub mod series;
pub mod synonyms;

pub use assemble::{AssembledPage, ResultAssembler, assemble};
pub use facets::Facets;
pub use filters::{FilterSet, Pagination, SortKey, SortOrder};
pub use normalize::Normalization;
pub use scoring::{
    FieldContribution, MatchField, MatchKind, PreparedKeyword, ScoredCandidate,
    ScoringEngine, ScoringWeights,
};
pub use series::{
    SeriesClass, SeriesGroupEntry, SeriesSignal, base_name, classify,
    group_latest_per_series, part_number, series_groups,
};
pub use synonyms::{SynonymEntry, SynonymTable};
