//! Client for the KKPhim public catalog API.
//!
//! Keyword queries go to `/v1/api/tim-kiem`, filtered listings to the
//! per-category, per-country, per-year and per-type listings, and plain
//! browsing to `/danh-sach/phim-moi-cap-nhat`. Each request walks up to
//! `page_depth` pages. A failing page is logged and skipped; the request
//! fails only when no page could be fetched.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use phimdex_model::{MovieRecord, lenient};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::catalog::{CandidateRequest, CatalogSource};
use crate::error::{CatalogError, Result};

pub const DEFAULT_BASE_URL: &str = "https://phimapi.com";
pub const DEFAULT_CDN_IMAGE_URL: &str = "https://phimimg.com";
pub const DEFAULT_PAGE_DEPTH: u32 = 5;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UpstreamPagination {
    #[serde(default, deserialize_with = "lenient::number")]
    total_pages: u32,
}

#[derive(Debug, Deserialize, Default)]
struct ListParams {
    #[serde(default)]
    pagination: Option<UpstreamPagination>,
}

#[derive(Debug, Deserialize, Default)]
struct ListData {
    #[serde(default)]
    items: Vec<MovieRecord>,
    #[serde(default)]
    params: Option<ListParams>,
    #[serde(default, rename = "APP_DOMAIN_CDN_IMAGE")]
    cdn_image: Option<String>,
}

/// Listing response. The legacy browse endpoint puts `items` and
/// `pagination` at the top level; the v1 endpoints nest them under `data`.
#[derive(Debug, Deserialize, Default)]
pub(crate) struct ListEnvelope {
    #[serde(default)]
    items: Option<Vec<MovieRecord>>,
    #[serde(default)]
    pagination: Option<UpstreamPagination>,
    #[serde(default)]
    data: Option<ListData>,
}

#[derive(Debug)]
struct ListingPage {
    items: Vec<MovieRecord>,
    total_pages: u32,
    cdn_image: Option<String>,
}

impl ListEnvelope {
    fn into_page(self) -> ListingPage {
        let top_pages = self.pagination.map(|p| p.total_pages);
        match self.data {
            Some(data) => ListingPage {
                total_pages: data
                    .params
                    .and_then(|params| params.pagination)
                    .map(|p| p.total_pages)
                    .or(top_pages)
                    .unwrap_or_default(),
                items: self.items.unwrap_or(data.items),
                cdn_image: data.cdn_image,
            },
            None => ListingPage {
                items: self.items.unwrap_or_default(),
                total_pages: top_pages.unwrap_or_default(),
                cdn_image: None,
            },
        }
    }

    pub(crate) fn into_items(self) -> Vec<MovieRecord> {
        self.into_page().items
    }
}

#[derive(Debug, Deserialize)]
struct DetailEnvelope {
    #[serde(default)]
    movie: Option<MovieRecord>,
}

/// Which upstream listing serves a request.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Endpoint {
    Search(String),
    Category(String),
    Country(String),
    Year(u32),
    List(&'static str),
    Latest,
}

impl Endpoint {
    /// Keyword first, then the most selective filter.
    fn for_request(request: &CandidateRequest) -> Self {
        let filters = &request.filters;
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        if request.has_keyword() {
            return Endpoint::Search(request.keyword.clone());
        }
        if let Some(category) = non_empty(&filters.category) {
            return Endpoint::Category(category);
        }
        if let Some(country) = non_empty(&filters.country) {
            return Endpoint::Country(country);
        }
        if let Some(year) = filters.year {
            return Endpoint::Year(year);
        }
        if let Some(slug) = filters.movie_kind().and_then(|k| k.list_slug()) {
            return Endpoint::List(slug);
        }
        Endpoint::Latest
    }

    fn url(&self, base: &Url, page: u32) -> Result<Url> {
        let year;
        let segments: Vec<&str> = match self {
            Endpoint::Search(_) => vec!["v1", "api", "tim-kiem"],
            Endpoint::Category(slug) => {
                vec!["v1", "api", "the-loai", slug.as_str()]
            }
            Endpoint::Country(slug) => {
                vec!["v1", "api", "quoc-gia", slug.as_str()]
            }
            Endpoint::Year(value) => {
                year = value.to_string();
                vec!["v1", "api", "nam", year.as_str()]
            }
            Endpoint::List(slug) => vec!["v1", "api", "danh-sach", *slug],
            Endpoint::Latest => vec!["danh-sach", "phim-moi-cap-nhat"],
        };

        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        {
            let mut query = url.query_pairs_mut();
            if let Endpoint::Search(keyword) = self {
                query.append_pair("keyword", keyword);
            }
            query.append_pair("page", &page.to_string());
        }
        Ok(url)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Search(keyword) => write!(f, "search({keyword})"),
            Endpoint::Category(slug) => write!(f, "category({slug})"),
            Endpoint::Country(slug) => write!(f, "country({slug})"),
            Endpoint::Year(year) => write!(f, "year({year})"),
            Endpoint::List(slug) => write!(f, "list({slug})"),
            Endpoint::Latest => write!(f, "latest"),
        }
    }
}

/// Resolves a relative image path against the CDN base.
fn absolutize(cdn: &Url, path: &str) -> String {
    let path = path.trim();
    if path.is_empty()
        || path.starts_with("http://")
        || path.starts_with("https://")
    {
        return path.to_string();
    }
    cdn.join(path.trim_start_matches('/'))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| path.to_string())
}

fn with_base(url: &str) -> Result<Url> {
    let mut parsed = Url::parse(url.trim())?;
    if !parsed.path().ends_with('/') {
        let path = format!("{}/", parsed.path());
        parsed.set_path(&path);
    }
    Ok(parsed)
}

#[derive(Debug, Clone)]
pub struct KkphimSourceBuilder {
    base_url: String,
    cdn_image_url: String,
    page_depth: u32,
    timeout: Duration,
}

impl Default for KkphimSourceBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cdn_image_url: DEFAULT_CDN_IMAGE_URL.to_string(),
            page_depth: DEFAULT_PAGE_DEPTH,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl KkphimSourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn cdn_image_url(mut self, cdn_image_url: impl Into<String>) -> Self {
        self.cdn_image_url = cdn_image_url.into();
        self
    }

    pub fn page_depth(mut self, page_depth: u32) -> Self {
        self.page_depth = page_depth.max(1);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<KkphimSource> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("phimdex/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(KkphimSource {
            client,
            base_url: with_base(&self.base_url)?,
            cdn_image_url: with_base(&self.cdn_image_url)?,
            page_depth: self.page_depth,
        })
    }
}

#[derive(Debug, Clone)]
pub struct KkphimSource {
    client: Client,
    base_url: Url,
    cdn_image_url: Url,
    page_depth: u32,
}

impl KkphimSource {
    pub fn builder() -> KkphimSourceBuilder {
        KkphimSourceBuilder::new()
    }

    pub fn page_depth(&self) -> u32 {
        self.page_depth
    }

    async fn get_json<T>(&self, url: Url) -> Result<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        debug!(%url, "Requesting catalog");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(CatalogError::UpstreamStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.text().await?;
        Ok(Some(serde_json::from_str(&body)?))
    }

    async fn fetch_page(
        &self,
        endpoint: &Endpoint,
        page: u32,
    ) -> Result<ListingPage> {
        let url = endpoint.url(&self.base_url, page)?;
        let envelope: ListEnvelope =
            self.get_json(url).await?.unwrap_or_default();
        let mut listing = envelope.into_page();

        let cdn = listing
            .cdn_image
            .as_deref()
            .and_then(|domain| with_base(domain).ok())
            .unwrap_or_else(|| self.cdn_image_url.clone());
        for record in &mut listing.items {
            self.resolve_images(record, &cdn);
        }
        Ok(listing)
    }

    fn resolve_images(&self, record: &mut MovieRecord, cdn: &Url) {
        record.poster_url = absolutize(cdn, &record.poster_url);
        record.thumb_url = absolutize(cdn, &record.thumb_url);
    }
}

#[async_trait]
impl CatalogSource for KkphimSource {
    fn id(&self) -> &'static str {
        "kkphim"
    }

    async fn candidates(
        &self,
        request: &CandidateRequest,
    ) -> Result<Vec<MovieRecord>> {
        let endpoint = Endpoint::for_request(request);
        let mut records = Vec::new();
        let mut fetched_pages = 0u32;
        let mut last_error = None;
        let mut last_page = self.page_depth;
        let mut page = 1;

        while page <= last_page {
            match self.fetch_page(&endpoint, page).await {
                Ok(listing) => {
                    fetched_pages += 1;
                    if listing.total_pages > 0 {
                        last_page = listing.total_pages.min(self.page_depth);
                    }
                    if listing.items.is_empty() {
                        break;
                    }
                    records.extend(listing.items);
                }
                Err(err) => {
                    warn!(
                        %endpoint,
                        page,
                        error = %err,
                        "Skipping catalog page that failed to load"
                    );
                    last_error = Some(err);
                }
            }
            page += 1;
        }

        if fetched_pages == 0
            && let Some(err) = last_error
        {
            return Err(err);
        }

        info!(
            %endpoint,
            pages = fetched_pages,
            records = records.len(),
            "Fetched catalog candidates"
        );
        Ok(records)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<MovieRecord>> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Ok(None);
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(["phim", slug]);

        let detail: Option<DetailEnvelope> = self.get_json(url).await?;
        let Some(mut movie) = detail
            .and_then(|detail| detail.movie)
            .filter(|movie| !movie.slug.is_empty())
        else {
            return Ok(None);
        };

        let cdn = self.cdn_image_url.clone();
        self.resolve_images(&mut movie, &cdn);
        Ok(Some(movie))
    }
}
