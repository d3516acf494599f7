//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod data_url;
pub mod health;
pub mod upload;

/// Creates the `/api` router.
pub fn api_routes(max_file_size: usize) -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(upload::routes(max_file_size))
}
