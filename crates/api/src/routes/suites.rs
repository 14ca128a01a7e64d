//! Route definitions for test suites and suite runs.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::suites;
use crate::state::AppState;

/// Suite routes mounted at `/suites`.
///
/// Static segments (`/run`, `/runs`) are registered alongside the `{id}`
/// capture; Axum matches them first.
///
/// ```text
/// GET    /                  -> list_suites (?templateId= filter)
/// POST   /                  -> create_suite
/// POST   /run               -> run_suite
/// GET    /runs              -> list_suite_runs (?suiteId= filter)
/// GET    /{id}              -> get_suite
/// PUT    /{id}              -> update_suite
/// DELETE /{id}              -> delete_suite
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(suites::list_suites).post(suites::create_suite))
        .route("/run", post(suites::run_suite))
        .route("/runs", get(suites::list_suite_runs))
        .route(
            "/{id}",
            get(suites::get_suite)
                .put(suites::update_suite)
                .delete(suites::delete_suite),
        )
}
