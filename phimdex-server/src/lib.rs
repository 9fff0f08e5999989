//! # Phimdex Server
//!
//! JSON search API over a movie catalog. Candidates come from the KKPhim
//! API or a local JSON file; `phimdex-core` ranks, groups and paginates
//! them per request.

pub mod api;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
