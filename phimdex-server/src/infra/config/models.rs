use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use phimdex_core::catalog::kkphim;
use phimdex_core::search::filters::DEFAULT_PAGE_LIMIT;
use phimdex_core::search::{Normalization, ScoringWeights};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 256;
pub const DEFAULT_MAX_LIMIT: usize = 100;

/// Fully resolved runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub search: SearchConfig,
    pub cache: CacheConfig,
    pub cors: CorsConfig,
    pub dev_mode: bool,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where candidate records come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSourceKind {
    /// The KKPhim HTTP API.
    #[default]
    Upstream,
    /// A local JSON file loaded at startup.
    File,
}

impl FromStr for CatalogSourceKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "upstream" | "kkphim" | "api" => Ok(Self::Upstream),
            "file" | "json" => Ok(Self::File),
            other => Err(format!("unknown catalog source '{other}'")),
        }
    }
}

impl fmt::Display for CatalogSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upstream => f.write_str("upstream"),
            Self::File => f.write_str("file"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub source: CatalogSourceKind,
    pub base_url: String,
    pub cdn_image_url: String,
    pub page_depth: u32,
    pub request_timeout: Duration,
    pub data_file: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: CatalogSourceKind::Upstream,
            base_url: kkphim::DEFAULT_BASE_URL.to_string(),
            cdn_image_url: kkphim::DEFAULT_CDN_IMAGE_URL.to_string(),
            page_depth: kkphim::DEFAULT_PAGE_DEPTH,
            request_timeout: kkphim::DEFAULT_TIMEOUT,
            data_file: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub weights: ScoringWeights,
    pub fold_diacritics: bool,
    pub default_limit: usize,
    pub max_limit: usize,
    pub synonyms_file: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            fold_diacritics: false,
            default_limit: DEFAULT_PAGE_LIMIT,
            max_limit: DEFAULT_MAX_LIMIT,
            synonyms_file: None,
        }
    }
}

impl SearchConfig {
    pub fn normalization(&self) -> Normalization {
        Normalization::from_fold_flag(self.fold_diacritics)
    }
}

/// TTL caching of upstream candidates and assembled responses.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl: Duration,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn is_wildcard_included(&self) -> bool {
        self.allowed_origins
            .iter()
            .any(|origin| origin.trim() == "*")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
