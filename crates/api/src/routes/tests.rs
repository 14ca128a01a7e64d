//! Route definitions for test cases and single-case runs.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tests;
use crate::state::AppState;

/// Test-case routes mounted at `/tests`.
///
/// ```text
/// GET    /                  -> list_test_cases (filtered)
/// POST   /                  -> create_test_case
/// POST   /run               -> run_test_case
/// GET    /runs              -> list_runs (filtered)
/// GET    /{id}              -> get_test_case
/// DELETE /{id}              -> delete_test_case
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(tests::list_test_cases).post(tests::create_test_case),
        )
        .route("/run", post(tests::run_test_case))
        .route("/runs", get(tests::list_runs))
        .route(
            "/{id}",
            get(tests::get_test_case).delete(tests::delete_test_case),
        )
}
