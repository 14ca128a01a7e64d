pub mod health;
pub mod snippets;
pub mod suites;
pub mod templates;
pub mod tests;

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /templates                       list, create
/// /templates/{id}                  get, update, delete
/// /templates/{id}/versions         list, create
///
/// /snippets                        list (with ?q= search), create
/// /snippets/{id}                   get, update, delete
/// /snippets/{id}/reviews           add review
///
/// /suites                          list (with ?templateId=), create
/// /suites/run                      run a suite (POST)
/// /suites/runs                     list suite runs
/// /suites/{id}                     get, update, delete
///
/// /tests                           list cases (filtered), create
/// /tests/run                       run a single case (POST)
/// /tests/runs                      list runs (filtered)
/// /tests/{id}                      get, delete
///
/// /compile                         compile-only (POST)
/// /validate                        third-party validation proxy (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/templates", templates::router())
        .nest("/snippets", snippets::router())
        .nest("/suites", suites::router())
        .nest("/tests", tests::router())
        .route("/compile", post(handlers::compile::compile))
        .route("/validate", post(handlers::compile::validate))
}
