//! Phimdex core: relevance search over a movie catalog.
//!
//! The [`search`] module is synchronous and pure; it ranks, groups and
//! paginates an in-memory candidate list. The [`catalog`] module supplies
//! those candidates from the upstream KKPhim API, a JSON file, or memory.
#![allow(missing_docs)]

pub mod cache;
pub mod catalog;
pub mod error;
pub mod search;

pub use phimdex_model::{MovieKind, MovieRecord, Taxon};

pub use cache::TtlCache;
pub use catalog::{
    CachedCatalog, CandidateRequest, CatalogSource, InMemoryCatalog,
    JsonFileCatalog, KkphimSource,
};
pub use error::{CatalogError, Result};
pub use search::{
    AssembledPage, FilterSet, Normalization, Pagination, ResultAssembler,
    ScoredCandidate, ScoringEngine, ScoringWeights, SortKey, SortOrder,
    SynonymTable,
};
