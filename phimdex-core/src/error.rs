use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Upstream returned status {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid synonym table: {0}")]
    InvalidSynonyms(String),

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Movie not found: {0}")]
    NotFound(String),
}

impl CatalogError {
    /// True when the failure originates from the upstream catalog rather
    /// than from local input.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            CatalogError::Http(_)
                | CatalogError::UpstreamStatus { .. }
                | CatalogError::Unavailable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
