use std::sync::Arc;

use phimdex_core::search::{AssembledPage, Pagination};
use phimdex_core::{CandidateRequest, TtlCache};

use crate::infra::config::CacheConfig;

/// Listing endpoint a cached page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingRoute {
    Browse,
    Search,
    Series,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseKey {
    pub route: ListingRoute,
    pub request: CandidateRequest,
    pub pagination: Pagination,
}

/// Assembled pages by `(route, keyword, filters, page, limit)`.
#[derive(Debug)]
pub struct ResponseCache {
    pages: Option<TtlCache<ResponseKey, Arc<AssembledPage>>>,
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        if config.enabled {
            Self {
                pages: Some(TtlCache::new(config.ttl, config.max_entries)),
            }
        } else {
            Self::disabled()
        }
    }

    pub fn disabled() -> Self {
        Self { pages: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.pages.is_some()
    }

    pub fn get(&self, key: &ResponseKey) -> Option<Arc<AssembledPage>> {
        self.pages.as_ref()?.get(key)
    }

    pub fn insert(&self, key: ResponseKey, page: Arc<AssembledPage>) {
        if let Some(pages) = &self.pages {
            pages.insert(key, page);
        }
    }
}
