//! Repository for the `templates` table.

use sqlx::PgPool;

use rulestudio_core::types::DbId;

use crate::models::template::{NewVersion, Template, TemplateMetaUpdate, TemplateVersion};
use crate::repositories::version_repo::VersionRepo;

const COLUMNS: &str = "id, name, slug, description, author_name, is_published, \
     published_at, current_version_id, created_at, updated_at";

/// Provides CRUD operations for templates.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Create a template together with its initial version, atomically.
    ///
    /// The template row, the version row, the snippet links, and the
    /// current-version pointer all commit or roll back together.
    pub async fn create_with_version(
        pool: &PgPool,
        name: &str,
        slug: &str,
        description: Option<&str>,
        author_name: Option<&str>,
        is_published: bool,
        version: &NewVersion,
    ) -> Result<(Template, TemplateVersion), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO templates (name, slug, description, author_name, is_published, published_at) \
             VALUES ($1, $2, $3, $4, $5, CASE WHEN $5 THEN now() END) \
             RETURNING {COLUMNS}"
        );
        let template: Template = sqlx::query_as(&query)
            .bind(name)
            .bind(slug)
            .bind(description)
            .bind(author_name)
            .bind(is_published)
            .fetch_one(&mut *tx)
            .await?;

        let created = VersionRepo::insert_in_tx(&mut tx, template.id, version).await?;

        tx.commit().await?;

        // Re-read is unnecessary: only the pointer and updated_at moved.
        let template = Template {
            current_version_id: Some(created.id),
            ..template
        };
        Ok((template, created))
    }

    /// Update template metadata and append a new version in one transaction.
    pub async fn update_with_version(
        pool: &PgPool,
        id: DbId,
        meta: &TemplateMetaUpdate,
        version: &NewVersion,
    ) -> Result<(Template, TemplateVersion), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let created = VersionRepo::insert_in_tx(&mut tx, id, version).await?;

        let query = format!(
            "UPDATE templates SET \
                name = $2, description = $3, author_name = $4, \
                is_published = $5, published_at = $6, updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let template: Template = sqlx::query_as(&query)
            .bind(id)
            .bind(&meta.name)
            .bind(&meta.description)
            .bind(&meta.author_name)
            .bind(meta.is_published)
            .bind(meta.published_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((template, created))
    }

    /// Find a template by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE id = $1");
        sqlx::query_as(&query).bind(id).fetch_optional(pool).await
    }

    /// List all templates, most recently updated first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates ORDER BY updated_at DESC");
        sqlx::query_as(&query).fetch_all(pool).await
    }

    /// Hard-delete a template (versions cascade). Returns `true` if a row
    /// was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
