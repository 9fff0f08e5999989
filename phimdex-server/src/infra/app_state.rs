use std::{fmt, sync::Arc};

use anyhow::Context;
use phimdex_core::catalog::{
    CachedCatalog, CatalogSource, JsonFileCatalog, KkphimSource,
};
use phimdex_core::search::{ResultAssembler, ScoringEngine, SynonymTable};
use tracing::info;

use crate::infra::cache::ResponseCache;
use crate::infra::config::{CatalogSourceKind, Config};

#[derive(Clone)]
pub struct AppState {
    pub assembler: Arc<ResultAssembler>,
    pub catalog: Arc<dyn CatalogSource>,
    pub responses: Arc<ResponseCache>,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("catalog", &self.catalog.id())
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: Arc<dyn CatalogSource>,
        assembler: ResultAssembler,
    ) -> Self {
        let responses = ResponseCache::new(&config.cache);
        Self {
            assembler: Arc::new(assembler),
            catalog,
            responses: Arc::new(responses),
            config: Arc::new(config),
        }
    }

    /// Builds the catalog source and scoring engine described by `config`.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let catalog = build_catalog(&config)?;
        let assembler = ResultAssembler::new(build_engine(&config)?);
        Ok(Self::new(config, catalog, assembler))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn build_catalog(config: &Config) -> anyhow::Result<Arc<dyn CatalogSource>> {
    let settings = &config.catalog;
    match settings.source {
        CatalogSourceKind::Upstream => {
            let source = KkphimSource::builder()
                .base_url(settings.base_url.clone())
                .cdn_image_url(settings.cdn_image_url.clone())
                .page_depth(settings.page_depth)
                .timeout(settings.request_timeout)
                .build()
                .context("failed to build KKPhim client")?;
            info!(
                base_url = %settings.base_url,
                page_depth = settings.page_depth,
                "Using KKPhim catalog"
            );
            Ok(wrap_cached(source, config))
        }
        CatalogSourceKind::File => {
            let path = settings
                .data_file
                .as_deref()
                .context("catalog.data_file is not set")?;
            let source = JsonFileCatalog::load(path).with_context(|| {
                format!("failed to load catalog file {}", path.display())
            })?;
            Ok(Arc::new(source))
        }
    }
}

fn wrap_cached<S>(source: S, config: &Config) -> Arc<dyn CatalogSource>
where
    S: CatalogSource + 'static,
{
    if config.cache.enabled {
        Arc::new(CachedCatalog::with_capacity(
            source,
            config.cache.ttl,
            config.cache.max_entries,
        ))
    } else {
        Arc::new(source)
    }
}

fn build_engine(config: &Config) -> anyhow::Result<ScoringEngine> {
    let synonyms = match &config.search.synonyms_file {
        Some(path) => {
            let table = SynonymTable::load_from_path(path).with_context(|| {
                format!("failed to load synonym table {}", path.display())
            })?;
            info!(
                path = %path.display(),
                entries = table.len(),
                "Loaded synonym table"
            );
            Arc::new(table)
        }
        None => SynonymTable::builtin(),
    };

    Ok(ScoringEngine::new(synonyms)
        .with_weights(config.search.weights)
        .with_normalization(config.search.normalization()))
}
