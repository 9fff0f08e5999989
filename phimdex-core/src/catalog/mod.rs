//! Candidate record sources.
//!
//! The search core never fetches anything itself; a [`CatalogSource`]
//! supplies the candidate list for a request and the assembler ranks it.

pub mod cached;
pub mod file;
pub mod kkphim;

use async_trait::async_trait;
use phimdex_model::MovieRecord;

use crate::error::Result;
use crate::search::FilterSet;

pub use cached::CachedCatalog;
pub use file::{InMemoryCatalog, JsonFileCatalog};
pub use kkphim::{KkphimSource, KkphimSourceBuilder};

/// What a listing or search needs from the catalog. Sources may use it to
/// narrow their fetch; the assembler applies the filters again regardless.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CandidateRequest {
    pub keyword: String,
    pub filters: FilterSet,
}

impl CandidateRequest {
    pub fn browse(filters: FilterSet) -> Self {
        Self {
            keyword: String::new(),
            filters,
        }
    }

    pub fn search(keyword: impl Into<String>, filters: FilterSet) -> Self {
        Self {
            keyword: keyword.into().trim().to_string(),
            filters,
        }
    }

    pub fn has_keyword(&self) -> bool {
        !self.keyword.is_empty()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Short identifier used in logs.
    fn id(&self) -> &'static str;

    /// Candidate records for a request. Order is the source's natural
    /// order; duplicates are allowed.
    async fn candidates(
        &self,
        request: &CandidateRequest,
    ) -> Result<Vec<MovieRecord>>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<MovieRecord>>;
}

#[async_trait]
impl<S> CatalogSource for std::sync::Arc<S>
where
    S: CatalogSource + ?Sized,
{
    fn id(&self) -> &'static str {
        (**self).id()
    }

    async fn candidates(
        &self,
        request: &CandidateRequest,
    ) -> Result<Vec<MovieRecord>> {
        (**self).candidates(request).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<MovieRecord>> {
        (**self).find_by_slug(slug).await
    }
}
