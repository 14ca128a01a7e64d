//! Repository for the `template_versions` table and its snippet links.

use sqlx::{PgPool, Postgres, Transaction};

use rulestudio_core::types::DbId;

use crate::models::snippet::HelperSnippet;
use crate::models::template::{NewVersion, TemplateVersion};

pub(crate) const VERSION_COLUMNS: &str = "id, template_id, parent_version_id, title, message, \
     user_params, ai_tunables, helpers, main, compiled, created_at";

/// Provides operations on the append-only version history.
pub struct VersionRepo;

impl VersionRepo {
    /// Insert a version row, link its snippets, and move the owning
    /// template's current-version pointer. Runs inside the caller's
    /// transaction so the three statements commit atomically.
    pub(crate) async fn insert_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        template_id: DbId,
        input: &NewVersion,
    ) -> Result<TemplateVersion, sqlx::Error> {
        let query = format!(
            "INSERT INTO template_versions \
                (template_id, parent_version_id, title, message, \
                 user_params, ai_tunables, helpers, main, compiled) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {VERSION_COLUMNS}"
        );
        let version: TemplateVersion = sqlx::query_as(&query)
            .bind(template_id)
            .bind(input.parent_version_id)
            .bind(&input.title)
            .bind(&input.message)
            .bind(&input.user_params)
            .bind(&input.ai_tunables)
            .bind(&input.helpers)
            .bind(&input.main)
            .bind(&input.compiled)
            .fetch_one(&mut **tx)
            .await?;

        for snippet_id in &input.snippet_ids {
            sqlx::query(
                "INSERT INTO template_version_snippets (version_id, snippet_id) \
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(version.id)
            .bind(snippet_id)
            .execute(&mut **tx)
            .await?;
        }

        sqlx::query(
            "UPDATE templates SET current_version_id = $2, updated_at = now() WHERE id = $1",
        )
        .bind(template_id)
        .bind(version.id)
        .execute(&mut **tx)
        .await?;

        Ok(version)
    }

    /// Create a new version for a template, atomically with the pointer move.
    pub async fn create(
        pool: &PgPool,
        template_id: DbId,
        input: &NewVersion,
    ) -> Result<TemplateVersion, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let version = Self::insert_in_tx(&mut tx, template_id, input).await?;
        tx.commit().await?;
        Ok(version)
    }

    /// Find a version by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TemplateVersion>, sqlx::Error> {
        let query = format!("SELECT {VERSION_COLUMNS} FROM template_versions WHERE id = $1");
        sqlx::query_as(&query).bind(id).fetch_optional(pool).await
    }

    /// The newest version of a template, if any.
    pub async fn latest_for_template(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<Option<TemplateVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {VERSION_COLUMNS} FROM template_versions \
             WHERE template_id = $1 ORDER BY created_at DESC, id DESC LIMIT 1"
        );
        sqlx::query_as(&query)
            .bind(template_id)
            .fetch_optional(pool)
            .await
    }

    /// Full version history of a template, newest first.
    pub async fn list_for_template(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<Vec<TemplateVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {VERSION_COLUMNS} FROM template_versions \
             WHERE template_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as(&query)
            .bind(template_id)
            .fetch_all(pool)
            .await
    }

    /// Helper snippets attached to a version, in attachment (creation) order.
    pub async fn snippets_for_version(
        pool: &PgPool,
        version_id: DbId,
    ) -> Result<Vec<HelperSnippet>, sqlx::Error> {
        sqlx::query_as(
            "SELECT s.id, s.name, s.description, s.code, s.tags, s.is_published, \
                    s.author_name, s.created_at, s.updated_at \
             FROM helper_snippets s \
             JOIN template_version_snippets l ON l.snippet_id = s.id \
             WHERE l.version_id = $1 \
             ORDER BY s.created_at ASC, s.id ASC",
        )
        .bind(version_id)
        .fetch_all(pool)
        .await
    }
}
