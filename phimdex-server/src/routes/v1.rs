use axum::{Router, routing::get};

use crate::AppState;
use crate::handlers::movies::{
    list_movies_handler, list_series_handler, movie_detail_handler,
    search_movies_handler, taxonomy_handler,
};

/// Create all v1 API routes
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies_handler))
        .route("/movies/search", get(search_movies_handler))
        .route("/movies/series", get(list_series_handler))
        .route("/movies/{slug}", get(movie_detail_handler))
        .route("/taxonomy", get(taxonomy_handler))
}
