use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use phimdex_model::MovieRecord;
use tracing::debug;

use crate::cache::TtlCache;
use crate::catalog::{CandidateRequest, CatalogSource};
use crate::error::Result;

pub const DEFAULT_MAX_ENTRIES: usize = 256;

/// TTL cache in front of another source, keyed by the candidate request.
/// Failures are never cached.
#[derive(Debug)]
pub struct CachedCatalog<S> {
    inner: S,
    candidates: TtlCache<CandidateRequest, Arc<Vec<MovieRecord>>>,
}

impl<S> CachedCatalog<S>
where
    S: CatalogSource,
{
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self::with_capacity(inner, ttl, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(inner: S, ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner,
            candidates: TtlCache::new(ttl, max_entries),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S> CatalogSource for CachedCatalog<S>
where
    S: CatalogSource,
{
    fn id(&self) -> &'static str {
        self.inner.id()
    }

    async fn candidates(
        &self,
        request: &CandidateRequest,
    ) -> Result<Vec<MovieRecord>> {
        if let Some(hit) = self.candidates.get(request) {
            debug!(source = self.inner.id(), "Candidate cache hit");
            return Ok(hit.as_ref().clone());
        }

        let records = self.inner.candidates(request).await?;
        self.candidates
            .insert(request.clone(), Arc::new(records.clone()));
        Ok(records)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<MovieRecord>> {
        self.inner.find_by_slug(slug).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MockCatalogSource;
    use crate::error::CatalogError;
    use crate::search::FilterSet;

    fn records() -> Vec<MovieRecord> {
        vec![MovieRecord::new("A", "a")]
    }

    #[tokio::test]
    async fn repeated_requests_hit_the_cache() {
        let mut source = MockCatalogSource::new();
        source.expect_id().return_const("mock");
        source
            .expect_candidates()
            .times(1)
            .returning(|_| Ok(records()));

        let cached = CachedCatalog::new(source, Duration::from_secs(60));
        let request = CandidateRequest::search("a", FilterSet::default());
        assert_eq!(cached.candidates(&request).await.unwrap().len(), 1);
        assert_eq!(cached.candidates(&request).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn distinct_requests_are_cached_separately() {
        let mut source = MockCatalogSource::new();
        source.expect_id().return_const("mock");
        source
            .expect_candidates()
            .times(2)
            .returning(|_| Ok(records()));

        let cached = CachedCatalog::new(source, Duration::from_secs(60));
        let first = CandidateRequest::search("a", FilterSet::default());
        let second = CandidateRequest::search("b", FilterSet::default());
        cached.candidates(&first).await.unwrap();
        cached.candidates(&second).await.unwrap();
        cached.candidates(&first).await.unwrap();
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let mut source = MockCatalogSource::new();
        source.expect_id().return_const("mock");
        let mut calls = 0;
        source.expect_candidates().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(CatalogError::Unavailable("down".into()))
            } else {
                Ok(records())
            }
        });

        let cached = CachedCatalog::new(source, Duration::from_secs(60));
        let request = CandidateRequest::default();
        assert!(cached.candidates(&request).await.is_err());
        assert_eq!(cached.candidates(&request).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn expired_entries_refetch() {
        let mut source = MockCatalogSource::new();
        source.expect_id().return_const("mock");
        source
            .expect_candidates()
            .times(2)
            .returning(|_| Ok(records()));

        let cached = CachedCatalog::new(source, Duration::ZERO);
        let request = CandidateRequest::default();
        cached.candidates(&request).await.unwrap();
        cached.candidates(&request).await.unwrap();
    }
}
