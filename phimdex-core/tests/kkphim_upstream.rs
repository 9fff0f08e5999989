//! `KkphimSource` against a local stand-in for the upstream API.

use std::collections::HashMap;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use phimdex_core::catalog::{CandidateRequest, CatalogSource, KkphimSource};
use phimdex_core::search::FilterSet;
use serde_json::json;

async fn latest(Query(params): Query<HashMap<String, String>>) -> Response {
    let page = params.get("page").map(String::as_str).unwrap_or("1");
    match page {
        "2" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        page => Json(json!({
            "status": true,
            "items": [
                {"name": format!("Latest {page}"), "slug": format!("latest-{page}"),
                 "year": 2024, "poster_url": "https://cdn.example/p.jpg"}
            ],
            "pagination": {"totalItems": 3, "totalItemsPerPage": 1,
                           "currentPage": page, "totalPages": 3}
        }))
        .into_response(),
    }
}

async fn search(Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
    let keyword = params.get("keyword").cloned().unwrap_or_default();
    Json(json!({
        "status": "success",
        "data": {
            "items": [{"name": keyword, "slug": "found", "poster_url": "upload/vod/found.jpg"}],
            "params": {"pagination": {"totalPages": 1}},
            "APP_DOMAIN_CDN_IMAGE": "https://img.example"
        }
    }))
}

async fn detail(Path(slug): Path<String>) -> Response {
    if slug == "known" {
        Json(json!({
            "status": true,
            "movie": {"name": "Known", "slug": "known", "actor": "A, B"},
            "episodes": []
        }))
        .into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"status": false, "msg": "Movie not found"})),
        )
            .into_response()
    }
}

async fn spawn_upstream() -> String {
    let router = Router::new()
        .route("/danh-sach/phim-moi-cap-nhat", get(latest))
        .route("/v1/api/tim-kiem", get(search))
        .route("/phim/{slug}", get(detail));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{address}")
}

fn source(base_url: &str) -> KkphimSource {
    KkphimSource::builder()
        .base_url(base_url)
        .cdn_image_url("https://phimimg.com")
        .page_depth(5)
        .build()
        .unwrap()
}

#[tokio::test]
async fn failed_pages_are_skipped_and_walk_stops_at_last_page() {
    let base_url = spawn_upstream().await;
    let records = source(&base_url)
        .candidates(&CandidateRequest::default())
        .await
        .unwrap();

    let slugs: Vec<&str> = records.iter().map(|r| r.slug.as_str()).collect();
    assert_eq!(slugs, vec!["latest-1", "latest-3"]);
    assert_eq!(records[0].poster_url, "https://cdn.example/p.jpg");
}

#[tokio::test]
async fn keyword_search_resolves_images_against_reported_cdn() {
    let base_url = spawn_upstream().await;
    let request = CandidateRequest::search("hàn quốc", FilterSet::default());
    let records = source(&base_url).candidates(&request).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "hàn quốc");
    assert_eq!(
        records[0].poster_url,
        "https://img.example/upload/vod/found.jpg"
    );
}

#[tokio::test]
async fn detail_lookup_maps_not_found_to_none() {
    let base_url = spawn_upstream().await;
    let source = source(&base_url);

    let known = source.find_by_slug("known").await.unwrap().unwrap();
    assert_eq!(known.actors, vec!["A", "B"]);
    assert!(source.find_by_slug("missing").await.unwrap().is_none());
}
