use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use phimdex_model::MovieRecord;
use serde::Deserialize;
use tracing::info;

use crate::catalog::kkphim::ListEnvelope;
use crate::catalog::{CandidateRequest, CatalogSource};
use crate::error::{CatalogError, Result};

/// Fixed record list held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    records: Arc<Vec<MovieRecord>>,
}

impl InMemoryCatalog {
    pub fn new(records: Vec<MovieRecord>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalog {
    fn id(&self) -> &'static str {
        "memory"
    }

    async fn candidates(
        &self,
        _request: &CandidateRequest,
    ) -> Result<Vec<MovieRecord>> {
        Ok(self.records.as_ref().clone())
    }

    /// The last record with the slug wins, matching result deduplication.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<MovieRecord>> {
        if slug.is_empty() {
            return Ok(None);
        }
        Ok(self
            .records
            .iter()
            .rev()
            .find(|record| record.slug == slug)
            .cloned())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Records(Vec<MovieRecord>),
    Envelope(ListEnvelope),
}

/// Records loaded once from a JSON file: either a plain array of records or
/// a saved upstream listing response.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    inner: InMemoryCatalog,
}

impl JsonFileCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let records = Self::parse(&contents)?;
        info!(
            path = %path.display(),
            records = records.len(),
            "Loaded catalog file"
        );
        Ok(Self {
            inner: InMemoryCatalog::new(records),
        })
    }

    pub fn parse(contents: &str) -> Result<Vec<MovieRecord>> {
        match serde_json::from_str::<CatalogFile>(contents) {
            Ok(CatalogFile::Records(records)) => Ok(records),
            Ok(CatalogFile::Envelope(envelope)) => Ok(envelope.into_items()),
            Err(_) => {
                // Re-parse as an array to surface a precise decode error.
                serde_json::from_str::<Vec<MovieRecord>>(contents)
                    .map_err(CatalogError::from)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl CatalogSource for JsonFileCatalog {
    fn id(&self) -> &'static str {
        "file"
    }

    async fn candidates(
        &self,
        request: &CandidateRequest,
    ) -> Result<Vec<MovieRecord>> {
        self.inner.candidates(request).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<MovieRecord>> {
        self.inner.find_by_slug(slug).await
    }
}
