//! Route definitions for helper snippets and their reviews.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::snippets;
use crate::state::AppState;

/// Snippet routes mounted at `/snippets`.
///
/// ```text
/// GET    /                  -> list_snippets (?q= search)
/// POST   /                  -> create_snippet
/// GET    /{id}              -> get_snippet
/// PUT    /{id}              -> update_snippet
/// DELETE /{id}              -> delete_snippet
/// POST   /{id}/reviews      -> add_review
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(snippets::list_snippets).post(snippets::create_snippet),
        )
        .route(
            "/{id}",
            get(snippets::get_snippet)
                .put(snippets::update_snippet)
                .delete(snippets::delete_snippet),
        )
        .route("/{id}/reviews", post(snippets::add_review))
}
