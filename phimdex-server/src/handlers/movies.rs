use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use phimdex_core::{CandidateRequest, CatalogError};
use phimdex_core::search::{
    AssembledPage, Facets, FilterSet, Pagination, SortKey, SortOrder,
};
use phimdex_model::MovieRecord;
use serde::Deserialize;
use tracing::debug;

use crate::api::{ApiEnvelope, MovieListData};
use crate::infra::{
    app_state::AppState,
    cache::{ListingRoute, ResponseKey},
    errors::{AppError, AppResult},
};

const EMPTY_SUGGESTION: &str =
    "No movies found. Try a shorter keyword or remove some filters.";

/// Raw listing query. Every field is read leniently: values that do not
/// parse are ignored rather than rejected.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct MovieQuery {
    pub keyword: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    pub country: Option<String>,
    pub year: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub sort: Option<String>,
    #[serde(rename = "sortType")]
    pub sort_type: Option<String>,
}

impl MovieQuery {
    pub fn keyword(&self) -> &str {
        self.keyword.as_deref().map(str::trim).unwrap_or_default()
    }

    pub fn filters(&self) -> FilterSet {
        FilterSet {
            category: non_blank(&self.category),
            country: non_blank(&self.country),
            year: parse_opt(&self.year).filter(|year: &u32| *year > 0),
            kind: non_blank(&self.kind),
            sort: parse_opt::<SortKey>(&self.sort),
            order: parse_opt::<SortOrder>(&self.sort_type),
        }
    }

    pub fn pagination(&self, default_limit: usize, max_limit: usize) -> Pagination {
        let page = parse_opt(&self.page).unwrap_or(1);
        let limit = parse_opt(&self.limit).unwrap_or(default_limit);
        Pagination::new(page, limit).capped(max_limit)
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn parse_opt<T: std::str::FromStr>(value: &Option<String>) -> Option<T> {
    value.as_deref().and_then(|raw| raw.trim().parse().ok())
}

/// Filter-only browsing; a keyword is honoured when present.
pub async fn list_movies_handler(
    State(state): State<AppState>,
    Query(query): Query<MovieQuery>,
) -> AppResult<Json<ApiEnvelope<MovieListData>>> {
    let page = run_listing(&state, ListingRoute::Browse, &query).await?;
    Ok(Json(envelope(&page, None)))
}

pub async fn search_movies_handler(
    State(state): State<AppState>,
    Query(query): Query<MovieQuery>,
) -> AppResult<Json<ApiEnvelope<MovieListData>>> {
    let keyword = query.keyword();
    if keyword.is_empty() {
        return Err(AppError::bad_request("Search keyword must not be empty"));
    }

    let page = run_listing(&state, ListingRoute::Search, &query).await?;
    Ok(Json(envelope(&page, Some(keyword))))
}

/// Like browsing, but multi-part series show only their latest part.
pub async fn list_series_handler(
    State(state): State<AppState>,
    Query(query): Query<MovieQuery>,
) -> AppResult<Json<ApiEnvelope<MovieListData>>> {
    let page = run_listing(&state, ListingRoute::Series, &query).await?;
    let keyword = Some(query.keyword()).filter(|keyword| !keyword.is_empty());
    Ok(Json(envelope(&page, keyword)))
}

pub async fn movie_detail_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiEnvelope<MovieRecord>>> {
    let movie = state
        .catalog
        .find_by_slug(slug.trim())
        .await?
        .ok_or_else(|| CatalogError::NotFound(slug.clone()))?;

    Ok(Json(ApiEnvelope::ok("Movie found", movie)))
}

/// Distinct categories, countries and years across the browsable catalog.
pub async fn taxonomy_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiEnvelope<Facets>>> {
    let records = state
        .catalog
        .candidates(&CandidateRequest::default())
        .await?;
    let facets = Facets::from_records(&records);
    Ok(Json(ApiEnvelope::ok("Taxonomy loaded", facets)))
}

async fn run_listing(
    state: &AppState,
    route: ListingRoute,
    query: &MovieQuery,
) -> AppResult<Arc<AssembledPage>> {
    let search = &state.config.search;
    let request = CandidateRequest::search(query.keyword(), query.filters());
    let pagination = query.pagination(search.default_limit, search.max_limit);
    let key = ResponseKey {
        route,
        request,
        pagination,
    };

    if let Some(page) = state.responses.get(&key) {
        debug!(?route, "Response cache hit");
        return Ok(page);
    }

    let records = state.catalog.candidates(&key.request).await?;
    let candidates = records.len();
    let request = &key.request;
    let page = match route {
        ListingRoute::Series => state.assembler.assemble_series_grouped(
            records,
            &request.keyword,
            &request.filters,
            pagination,
        ),
        ListingRoute::Browse | ListingRoute::Search => state.assembler.assemble(
            records,
            &request.keyword,
            &request.filters,
            pagination,
        ),
    };
    debug!(
        ?route,
        keyword = %request.keyword,
        candidates,
        matches = page.total_items,
        "Assembled listing"
    );

    let page = Arc::new(page);
    state.responses.insert(key, Arc::clone(&page));
    Ok(page)
}

fn envelope(
    page: &AssembledPage,
    keyword: Option<&str>,
) -> ApiEnvelope<MovieListData> {
    let message = match (page.is_empty(), keyword) {
        (true, _) => EMPTY_SUGGESTION.to_string(),
        (false, Some(keyword)) => {
            format!("Found {} movies matching \"{keyword}\"", page.total_items)
        }
        (false, None) => format!("Found {} movies", page.total_items),
    };
    ApiEnvelope::ok(message, MovieListData::from(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> MovieQuery {
        let map: serde_json::Map<String, serde_json::Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::from(*v)))
            .collect();
        serde_json::from_value(serde_json::Value::Object(map)).unwrap()
    }

    #[test]
    fn lenient_parsing_ignores_garbage() {
        let query = query(&[
            ("page", "abc"),
            ("limit", "-4"),
            ("year", "20x"),
            ("sort", "sideways"),
            ("sortType", "ASC"),
            ("category", "  "),
        ]);
        let pagination = query.pagination(24, 100);
        assert_eq!(pagination.page(), 1);
        assert_eq!(pagination.limit(), 24);

        let filters = query.filters();
        assert_eq!(filters.year, None);
        assert_eq!(filters.sort, None);
        assert_eq!(filters.order, Some(SortOrder::Asc));
        assert_eq!(filters.category, None);
    }

    #[test]
    fn limit_is_capped() {
        let query = query(&[("page", "0"), ("limit", "500")]);
        let pagination = query.pagination(24, 100);
        assert_eq!(pagination.page(), 1);
        assert_eq!(pagination.limit(), 100);
    }

    #[test]
    fn empty_pages_carry_a_suggestion() {
        let page = AssembledPage {
            items: Vec::new(),
            total_items: 0,
            total_pages: 0,
            current_page: 1,
            per_page: 24,
        };
        let body = envelope(&page, Some("zzz"));
        assert!(body.success);
        assert_eq!(body.message, EMPTY_SUGGESTION);
        assert_eq!(body.data.pagination.total_pages, 0);
    }
}
