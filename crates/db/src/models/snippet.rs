//! Helper-snippet and review models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use rulestudio_core::types::{DbId, Timestamp};

/// A row from the `helper_snippets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HelperSnippet {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub code: String,
    /// Comma-joined tags, `None` when untagged.
    pub tags: Option<String>,
    pub is_published: bool,
    pub author_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `snippet_reviews` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetReview {
    pub id: DbId,
    pub snippet_id: DbId,
    pub rating: i16,
    pub comment: Option<String>,
    pub author_name: Option<String>,
    pub created_at: Timestamp,
}

/// Snippet enriched with its reviews and aggregate rating.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetWithReviews {
    #[serde(flatten)]
    pub snippet: HelperSnippet,
    pub reviews: Vec<SnippetReview>,
    pub avg_rating: Option<f64>,
    pub review_count: i64,
}

/// DTO for creating a snippet; may carry an inline first review.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSnippet {
    pub name: String,
    pub description: Option<String>,
    pub code: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_published: Option<bool>,
    pub author_name: Option<String>,
    pub rating: Option<i16>,
    pub comment: Option<String>,
}

/// DTO for updating a snippet; may carry an inline review.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSnippet {
    pub name: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
    pub author_name: Option<String>,
    pub rating: Option<i16>,
    pub comment: Option<String>,
}
