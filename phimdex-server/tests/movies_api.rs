use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use phimdex_core::catalog::{CandidateRequest, CatalogSource, InMemoryCatalog};
use phimdex_core::search::ResultAssembler;
use phimdex_core::{CatalogError, MovieRecord};
use phimdex_server::{AppState, infra::config::Config, routes};
use serde_json::Value;

fn records() -> Vec<MovieRecord> {
    vec![
        MovieRecord::new("Hạ Cánh Nơi Anh", "ha-canh-noi-anh")
            .with_origin_name("Crash Landing on You")
            .with_year(2019)
            .with_category("Tình Cảm", "tinh-cam")
            .with_country("Korea", "korea"),
        MovieRecord::new("Show Phần 1", "show-phan-1").with_year(2020),
        MovieRecord::new("Show Phần 3", "show-phan-3").with_year(2022),
        MovieRecord::new("Show Phần 2", "show-phan-2").with_year(2021),
        MovieRecord::new("Batman", "batman")
            .with_year(1989)
            .with_country("Âu Mỹ", "au-my"),
    ]
}

fn server_with(catalog: Arc<dyn CatalogSource>) -> TestServer {
    let state = AppState::new(Config::default(), catalog, ResultAssembler::default());
    TestServer::new(routes::create_app(state)).unwrap()
}

fn server() -> TestServer {
    server_with(Arc::new(InMemoryCatalog::new(records())))
}

struct DownCatalog;

#[async_trait]
impl CatalogSource for DownCatalog {
    fn id(&self) -> &'static str {
        "down"
    }

    async fn candidates(
        &self,
        _request: &CandidateRequest,
    ) -> phimdex_core::Result<Vec<MovieRecord>> {
        Err(CatalogError::Unavailable("connection refused".into()))
    }

    async fn find_by_slug(
        &self,
        _slug: &str,
    ) -> phimdex_core::Result<Option<MovieRecord>> {
        Err(CatalogError::Unavailable("connection refused".into()))
    }
}

#[tokio::test]
async fn ping_reports_ok() {
    let response = server().get("/ping").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn search_finds_country_synonyms() {
    let response = server()
        .get("/api/v1/movies/search")
        .add_query_param("keyword", "hàn quốc")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["pagination"]["totalItems"], 1);
    assert_eq!(body["data"]["items"][0]["slug"], "ha-canh-noi-anh");
}

#[tokio::test]
async fn search_without_keyword_is_rejected() {
    let response = server()
        .get("/api/v1/movies/search")
        .add_query_param("keyword", "   ")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("keyword"));
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn browse_paginates_with_envelope() {
    let response = server()
        .get("/api/v1/movies")
        .add_query_param("page", "2")
        .add_query_param("limit", "2")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let pagination = &body["data"]["pagination"];
    assert_eq!(pagination["totalItems"], 5);
    assert_eq!(pagination["totalItemsPerPage"], 2);
    assert_eq!(pagination["currentPage"], 2);
    assert_eq!(pagination["totalPages"], 3);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn browse_applies_filters_and_ignores_bad_params() {
    let response = server()
        .get("/api/v1/movies")
        .add_query_param("country", "au-my")
        .add_query_param("page", "nope")
        .add_query_param("year", "soon")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"]["pagination"]["totalItems"], 1);
    assert_eq!(body["data"]["items"][0]["slug"], "batman");
}

#[tokio::test]
async fn series_listing_keeps_latest_part() {
    let response = server().get("/api/v1/movies/series").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let names: Vec<&str> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|item| item["name"].as_str())
        .collect();
    assert_eq!(names.len(), 3);
    assert!(names.contains(&"Show Phần 3"));
    assert!(!names.contains(&"Show Phần 1"));
    assert!(!names.contains(&"Show Phần 2"));
}

#[tokio::test]
async fn empty_results_carry_a_suggestion() {
    let response = server()
        .get("/api/v1/movies/search")
        .add_query_param("keyword", "qqqqzzzz")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["pagination"]["totalItems"], 0);
    assert!(body["message"].as_str().unwrap().starts_with("No movies found"));
}

#[tokio::test]
async fn detail_returns_record_or_404() {
    let server = server();

    let found = server.get("/api/v1/movies/batman").await;
    found.assert_status_ok();
    let body: Value = found.json();
    assert_eq!(body["data"]["name"], "Batman");

    let missing = server.get("/api/v1/movies/nope").await;
    missing.assert_status(StatusCode::NOT_FOUND);
    let body: Value = missing.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Movie not found: nope");
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn taxonomy_lists_distinct_terms() {
    let response = server().get("/api/v1/taxonomy").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let countries: Vec<&str> = body["data"]["countries"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|country| country["slug"].as_str())
        .collect();
    assert_eq!(countries, vec!["korea", "au-my"]);
    assert_eq!(body["data"]["years"][0], 2022);
}

#[tokio::test]
async fn upstream_failure_maps_to_bad_gateway() {
    let server = server_with(Arc::new(DownCatalog));

    let response = server
        .get("/api/v1/movies/search")
        .add_query_param("keyword", "batman")
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Bad Gateway");
}
