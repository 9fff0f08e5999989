use thiserror::Error;

use super::models::{CatalogSourceKind, Config};

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("catalog source 'file' requires catalog.data_file or PHIMDEX_CATALOG_FILE")]
    MissingCatalogFile,
    #[error("CORS wildcard origins are not allowed when DEV_MODE is false")]
    DangerousCorsWildcard,
    #[error("invalid search limits: {reason}")]
    InvalidLimits { reason: String },
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    if config.catalog.source == CatalogSourceKind::File
        && config.catalog.data_file.is_none()
    {
        return Err(ConfigGuardRailError::MissingCatalogFile);
    }

    if !config.dev_mode && config.cors.is_wildcard_included() {
        return Err(ConfigGuardRailError::DangerousCorsWildcard);
    }

    if config.search.max_limit == 0 {
        return Err(ConfigGuardRailError::InvalidLimits {
            reason: "max_limit must be at least 1".to_string(),
        });
    }

    if config.search.default_limit > config.search.max_limit {
        warnings.push_with_hint(
            format!(
                "search.default_limit ({}) exceeds search.max_limit ({}); pages will be capped",
                config.search.default_limit, config.search.max_limit
            ),
            "Lower search.default_limit or raise search.max_limit",
        );
    }

    if config.cache.enabled && config.cache.ttl.is_zero() {
        warnings.push_with_hint(
            "cache.ttl_secs is 0; every request will reach the catalog",
            "Set cache.enabled = false to make this explicit",
        );
    }

    if !config.dev_mode && config.cors.allowed_origins.is_empty() {
        warnings.push(
            "No CORS origins configured; browsers on other origins will be rejected",
        );
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn file_source_needs_a_data_file() {
        let mut config = Config::default();
        config.catalog.source = CatalogSourceKind::File;
        assert!(matches!(
            apply_guard_rails(&config),
            Err(ConfigGuardRailError::MissingCatalogFile)
        ));

        config.catalog.data_file = Some(PathBuf::from("catalog.json"));
        assert!(apply_guard_rails(&config).is_ok());
    }

    #[test]
    fn wildcard_cors_only_in_dev_mode() {
        let mut config = Config::default();
        config.cors.allowed_origins = vec!["*".to_string()];
        assert!(matches!(
            apply_guard_rails(&config),
            Err(ConfigGuardRailError::DangerousCorsWildcard)
        ));

        config.dev_mode = true;
        assert!(apply_guard_rails(&config).is_ok());
    }

    #[test]
    fn questionable_values_produce_warnings() {
        let mut config = Config::default();
        config.dev_mode = true;
        config.search.default_limit = 500;
        config.cache.ttl = Duration::ZERO;

        let warnings = apply_guard_rails(&config).unwrap();
        assert_eq!(warnings.items.len(), 2);
        assert!(warnings.items.iter().all(|w| w.hint.is_some()));
    }
}
