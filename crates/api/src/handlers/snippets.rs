//! Handlers for helper snippets and their reviews.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use sqlx::PgPool;

use rulestudio_core::error::CoreError;
use rulestudio_core::types::DbId;
use rulestudio_db::models::snippet::{
    CreateSnippet, HelperSnippet, SnippetWithReviews, UpdateSnippet,
};
use rulestudio_db::repositories::SnippetRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SnippetListParams {
    /// Case-insensitive substring match over name, description, and tags.
    pub q: Option<String>,
}

/// Request body for `POST /api/v1/snippets/{id}/reviews`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReview {
    pub rating: i16,
    pub comment: Option<String>,
    pub author_name: Option<String>,
}

/// GET /api/v1/snippets
pub async fn list_snippets(
    State(state): State<AppState>,
    Query(params): Query<SnippetListParams>,
) -> AppResult<impl IntoResponse> {
    let snippets = SnippetRepo::list(&state.pool, params.q.as_deref()).await?;

    let mut items = Vec::with_capacity(snippets.len());
    for snippet in snippets {
        items.push(with_reviews(&state.pool, snippet).await?);
    }

    Ok(Json(DataResponse { data: items }))
}

/// POST /api/v1/snippets
///
/// Create a snippet, optionally attaching an initial review when `rating`
/// is present in the body.
pub async fn create_snippet(
    State(state): State<AppState>,
    Json(input): Json<CreateSnippet>,
) -> AppResult<impl IntoResponse> {
    if input.name.trim().is_empty() {
        return Err(CoreError::Validation("Snippet name must not be empty".to_string()).into());
    }
    if input.code.trim().is_empty() {
        return Err(CoreError::Validation("Snippet code must not be empty".to_string()).into());
    }
    if let Some(rating) = input.rating {
        validate_rating(rating)?;
    }

    let snippet = SnippetRepo::create(&state.pool, &input).await?;

    tracing::info!(snippet_id = snippet.id, "Helper snippet created");

    let data = with_reviews(&state.pool, snippet).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/snippets/{id}
pub async fn get_snippet(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let snippet = SnippetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "helper snippet",
            id,
        })?;

    let data = with_reviews(&state.pool, snippet).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/snippets/{id}
///
/// Partial update; a `rating` in the body appends a review.
pub async fn update_snippet(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSnippet>,
) -> AppResult<impl IntoResponse> {
    if let Some(rating) = input.rating {
        validate_rating(rating)?;
    }

    let snippet = SnippetRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "helper snippet",
            id,
        })?;

    if let Some(rating) = input.rating {
        SnippetRepo::add_review(
            &state.pool,
            snippet.id,
            rating,
            input.comment.as_deref(),
            input.author_name.as_deref(),
        )
        .await?;
    }

    let data = with_reviews(&state.pool, snippet).await?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/snippets/{id}
pub async fn delete_snippet(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = SnippetRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(CoreError::NotFound {
            entity: "helper snippet",
            id,
        }
        .into());
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/snippets/{id}/reviews
pub async fn add_review(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateReview>,
) -> AppResult<impl IntoResponse> {
    validate_rating(input.rating)?;

    SnippetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "helper snippet",
            id,
        })?;

    let review = SnippetRepo::add_review(
        &state.pool,
        id,
        input.rating,
        input.comment.as_deref(),
        input.author_name.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: review })))
}

fn validate_rating(rating: i16) -> Result<(), AppError> {
    if !(1..=5).contains(&rating) {
        return Err(
            CoreError::Validation("Rating must be an integer between 1 and 5".to_string()).into(),
        );
    }
    Ok(())
}

/// Attach reviews and aggregate rating to a snippet row.
async fn with_reviews(
    pool: &PgPool,
    snippet: HelperSnippet,
) -> Result<SnippetWithReviews, AppError> {
    let reviews = SnippetRepo::reviews_for(pool, snippet.id).await?;
    let (avg_rating, review_count) = SnippetRepo::rating_stats(pool, snippet.id).await?;

    Ok(SnippetWithReviews {
        snippet,
        reviews,
        avg_rating,
        review_count,
    })
}
