use phimdex_core::search::ScoringWeights;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use super::models::CatalogSourceKind;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub catalog: FileCatalogConfig,
    #[serde(default)]
    pub search: FileSearchConfig,
    #[serde(default)]
    pub cache: FileCacheConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCatalogConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<CatalogSourceKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdn_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_depth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileSearchConfig {
    /// Missing weights keep their defaults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<ScoringWeights>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fold_diacritics: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synonyms_file: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCacheConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub catalog_source: Option<CatalogSourceKind>,
    pub kkphim_base_url: Option<String>,
    pub catalog_file: Option<PathBuf>,
    pub page_depth: Option<u32>,
    pub cache_ttl_secs: Option<u64>,
    pub fold_diacritics: Option<bool>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub dev_mode: Option<bool>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the environment view from an arbitrary variable lookup.
    /// Unparseable values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            config_path: lookup("PHIMDEX_CONFIG").map(PathBuf::from),
            server_host: lookup("SERVER_HOST"),
            server_port: parse_var(&lookup, "SERVER_PORT"),
            catalog_source: parse_var(&lookup, "PHIMDEX_CATALOG_SOURCE"),
            kkphim_base_url: lookup("KKPHIM_BASE_URL"),
            catalog_file: lookup("PHIMDEX_CATALOG_FILE").map(PathBuf::from),
            page_depth: parse_var(&lookup, "PHIMDEX_PAGE_DEPTH"),
            cache_ttl_secs: parse_var(&lookup, "PHIMDEX_CACHE_TTL_SECS"),
            fold_diacritics: lookup("PHIMDEX_FOLD_DIACRITICS")
                .as_deref()
                .and_then(parse_bool),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .as_deref()
                .map(parse_csv),
            dev_mode: lookup("DEV_MODE").as_deref().and_then(parse_bool),
        }
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(name).and_then(|raw| raw.trim().parse().ok())
}

fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|part| {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
