//! Repository for the `helper_snippets` and `snippet_reviews` tables.

use sqlx::{PgPool, Postgres, Transaction};

use rulestudio_core::types::DbId;

use crate::models::snippet::{CreateSnippet, HelperSnippet, SnippetReview, UpdateSnippet};

const COLUMNS: &str =
    "id, name, description, code, tags, is_published, author_name, created_at, updated_at";

const REVIEW_COLUMNS: &str = "id, snippet_id, rating, comment, author_name, created_at";

/// Provides CRUD operations for helper snippets and their reviews.
pub struct SnippetRepo;

impl SnippetRepo {
    /// Insert a new snippet, returning the created row. Tags are stored
    /// comma-joined; an empty tag list stores NULL. When the input carries
    /// a `rating`, the inline review commits or rolls back together with
    /// the snippet row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSnippet,
    ) -> Result<HelperSnippet, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let tags = if input.tags.is_empty() {
            None
        } else {
            Some(input.tags.join(","))
        };
        let query = format!(
            "INSERT INTO helper_snippets (name, description, code, tags, is_published, author_name) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        let snippet: HelperSnippet = sqlx::query_as(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.code)
            .bind(tags)
            .bind(input.is_published.unwrap_or(false))
            .bind(&input.author_name)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(rating) = input.rating {
            Self::insert_review_in_tx(
                &mut tx,
                snippet.id,
                rating,
                input.comment.as_deref(),
                input.author_name.as_deref(),
            )
            .await?;
        }

        tx.commit().await?;
        Ok(snippet)
    }

    /// Insert a review inside an open transaction.
    async fn insert_review_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        snippet_id: DbId,
        rating: i16,
        comment: Option<&str>,
        author_name: Option<&str>,
    ) -> Result<SnippetReview, sqlx::Error> {
        let query = format!(
            "INSERT INTO snippet_reviews (snippet_id, rating, comment, author_name) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {REVIEW_COLUMNS}"
        );
        sqlx::query_as(&query)
            .bind(snippet_id)
            .bind(rating)
            .bind(comment)
            .bind(author_name)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a snippet by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<HelperSnippet>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM helper_snippets WHERE id = $1");
        sqlx::query_as(&query).bind(id).fetch_optional(pool).await
    }

    /// Fetch snippets by ID, ordered by creation time (the compile
    /// attachment order).
    pub async fn find_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<HelperSnippet>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let query = format!(
            "SELECT {COLUMNS} FROM helper_snippets WHERE id = ANY($1) \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as(&query).bind(ids).fetch_all(pool).await
    }

    /// List snippets, optionally filtered by a case-insensitive search over
    /// name, description, tags, and author. Most recently updated first.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
    ) -> Result<Vec<HelperSnippet>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM helper_snippets \
             WHERE $1::text IS NULL \
                OR name ILIKE '%' || $1 || '%' \
                OR description ILIKE '%' || $1 || '%' \
                OR tags ILIKE '%' || $1 || '%' \
                OR author_name ILIKE '%' || $1 || '%' \
             ORDER BY updated_at DESC"
        );
        sqlx::query_as(&query).bind(search).fetch_all(pool).await
    }

    /// Update a snippet. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSnippet,
    ) -> Result<Option<HelperSnippet>, sqlx::Error> {
        let tags = input.tags.as_ref().map(|t| t.join(","));
        let query = format!(
            "UPDATE helper_snippets SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                code = COALESCE($4, code), \
                tags = COALESCE($5, tags), \
                is_published = COALESCE($6, is_published), \
                author_name = COALESCE($7, author_name), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.code)
            .bind(tags)
            .bind(input.is_published)
            .bind(&input.author_name)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a snippet (reviews cascade). Returns `true` if a row
    /// was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM helper_snippets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Append a review to a snippet.
    pub async fn add_review(
        pool: &PgPool,
        snippet_id: DbId,
        rating: i16,
        comment: Option<&str>,
        author_name: Option<&str>,
    ) -> Result<SnippetReview, sqlx::Error> {
        let query = format!(
            "INSERT INTO snippet_reviews (snippet_id, rating, comment, author_name) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {REVIEW_COLUMNS}"
        );
        sqlx::query_as(&query)
            .bind(snippet_id)
            .bind(rating)
            .bind(comment)
            .bind(author_name)
            .fetch_one(pool)
            .await
    }

    /// All reviews for a snippet, newest first.
    pub async fn reviews_for(
        pool: &PgPool,
        snippet_id: DbId,
    ) -> Result<Vec<SnippetReview>, sqlx::Error> {
        let query = format!(
            "SELECT {REVIEW_COLUMNS} FROM snippet_reviews \
             WHERE snippet_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as(&query)
            .bind(snippet_id)
            .fetch_all(pool)
            .await
    }

    /// Average rating and review count for a snippet.
    pub async fn rating_stats(
        pool: &PgPool,
        snippet_id: DbId,
    ) -> Result<(Option<f64>, i64), sqlx::Error> {
        let row: (Option<f64>, i64) = sqlx::query_as(
            "SELECT AVG(rating)::float8, COUNT(*) \
             FROM snippet_reviews WHERE snippet_id = $1",
        )
        .bind(snippet_id)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }
}
