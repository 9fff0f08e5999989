//! Layered runtime configuration. Precedence, highest first: process
//! environment (after `.env` is applied), TOML file, built-in defaults.

pub mod loader;
pub mod models;
pub mod sources;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader};
pub use models::{
    CacheConfig, CatalogConfig, CatalogSourceKind, Config, ConfigMetadata,
    CorsConfig, SearchConfig, ServerConfig,
};
pub use sources::{EnvConfig, FileConfig};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
