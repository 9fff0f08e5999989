use once_cell::sync::Lazy;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

use super::{
    models::{
        CacheConfig, CatalogConfig, Config, ConfigMetadata, CorsConfig,
        SearchConfig, ServerConfig,
    },
    sources::{EnvConfig, FileConfig},
    validation::{self, ConfigGuardRailError, ConfigWarnings},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("phimdex.toml"),
        PathBuf::from("config/phimdex.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
struct ConfigLoaderOptions {
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
    /// Use these values instead of reading the process environment. No
    /// `.env` file is loaded when set.
    env: Option<EnvConfig>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.options.env = Some(env);
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let (env_config, env_file_loaded) = match &self.options.env {
            Some(env) => (env.clone(), false),
            None => {
                let loaded = self.load_env_file()?;
                (EnvConfig::gather(), loaded)
            }
        };

        let (file_config, config_path) = self.load_file_config(&env_config)?;

        let (config, mut warnings) = self.compose_config(
            file_config,
            env_config,
            ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        );

        warnings.extend(validation::apply_guard_rails(&config)?);

        Ok(ConfigLoad { config, warnings })
    }

    /// A missing `.env` is not an error; a malformed one is.
    fn load_env_file(&self) -> Result<bool, ConfigLoadError> {
        let result = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path),
            None => dotenvy::dotenv().map(|_| ()),
        };
        match result {
            Ok(()) => Ok(true),
            Err(dotenvy::Error::Io(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env_config.config_path.clone());

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
            {
                Some(found) => found.clone(),
                None => return Ok((None, None)),
            },
        };

        let file_config = read_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }

    fn compose_config(
        &self,
        file_config: Option<FileConfig>,
        env: EnvConfig,
        metadata: ConfigMetadata,
    ) -> (Config, ConfigWarnings) {
        let mut warnings = ConfigWarnings::default();

        if metadata.config_path.is_none() {
            warnings.push_with_hint(
                "No phimdex.toml detected; using environment variables and defaults",
                "Create phimdex.toml or point PHIMDEX_CONFIG at a configuration file",
            );
        }

        let FileConfig {
            server: file_server,
            catalog: file_catalog,
            search: file_search,
            cache: file_cache,
            cors: file_cors,
            dev_mode: file_dev_mode,
        } = file_config.unwrap_or_default();

        let server_defaults = ServerConfig::default();
        let server = ServerConfig {
            host: env
                .server_host
                .or(file_server.host)
                .unwrap_or(server_defaults.host),
            port: env
                .server_port
                .or(file_server.port)
                .unwrap_or(server_defaults.port),
        };

        let catalog_defaults = CatalogConfig::default();
        let catalog = CatalogConfig {
            source: env
                .catalog_source
                .or(file_catalog.source)
                .unwrap_or(catalog_defaults.source),
            base_url: env
                .kkphim_base_url
                .or(file_catalog.base_url)
                .unwrap_or(catalog_defaults.base_url),
            cdn_image_url: file_catalog
                .cdn_image_url
                .unwrap_or(catalog_defaults.cdn_image_url),
            page_depth: env
                .page_depth
                .or(file_catalog.page_depth)
                .unwrap_or(catalog_defaults.page_depth)
                .max(1),
            request_timeout: file_catalog
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(catalog_defaults.request_timeout),
            data_file: env.catalog_file.or(file_catalog.data_file),
        };

        let search_defaults = SearchConfig::default();
        let search = SearchConfig {
            weights: file_search.weights.unwrap_or(search_defaults.weights),
            fold_diacritics: env
                .fold_diacritics
                .or(file_search.fold_diacritics)
                .unwrap_or(search_defaults.fold_diacritics),
            default_limit: file_search
                .default_limit
                .unwrap_or(search_defaults.default_limit)
                .max(1),
            max_limit: file_search
                .max_limit
                .unwrap_or(search_defaults.max_limit),
            synonyms_file: file_search.synonyms_file,
        };

        let cache_defaults = CacheConfig::default();
        let cache = CacheConfig {
            enabled: file_cache.enabled.unwrap_or(cache_defaults.enabled),
            ttl: env
                .cache_ttl_secs
                .or(file_cache.ttl_secs)
                .map(Duration::from_secs)
                .unwrap_or(cache_defaults.ttl),
            max_entries: file_cache
                .max_entries
                .unwrap_or(cache_defaults.max_entries),
        };

        let dev_mode = env.dev_mode.or(file_dev_mode).unwrap_or(false);

        let cors = CorsConfig {
            allowed_origins: env
                .cors_allowed_origins
                .or(file_cors.allowed_origins)
                .unwrap_or_else(|| {
                    if dev_mode {
                        default_cors_origins()
                    } else {
                        Vec::new()
                    }
                }),
        };

        let config = Config {
            server,
            catalog,
            search,
            cache,
            cors,
            dev_mode,
            metadata,
        };

        (config, warnings)
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents =
        fs::read_to_string(path).map_err(|err| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source: err,
        })?;
    toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source: err,
    })
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}
