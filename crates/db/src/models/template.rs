//! Template and template-version models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use rulestudio_core::types::{DbId, Timestamp};

use crate::models::snippet::HelperSnippet;

/// A row from the `templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub author_name: Option<String>,
    pub is_published: bool,
    pub published_at: Option<Timestamp>,
    pub current_version_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `template_versions` table: an immutable snapshot of the
/// four section texts plus the compiled output cached at creation time.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVersion {
    pub id: DbId,
    pub template_id: DbId,
    pub parent_version_id: Option<DbId>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub user_params: String,
    pub ai_tunables: String,
    pub helpers: String,
    pub main: String,
    pub compiled: String,
    pub created_at: Timestamp,
}

/// A version together with its attached helper snippets.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionWithSnippets {
    #[serde(flatten)]
    pub version: TemplateVersion,
    pub helper_snippets: Vec<HelperSnippet>,
}

/// A template together with its current (newest) version, as returned by
/// the list and detail endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateWithVersion {
    #[serde(flatten)]
    pub template: Template,
    pub current_version: Option<VersionWithSnippets>,
}

/// DTO for creating a template (first save creates the initial version).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplate {
    pub name: String,
    pub description: Option<String>,
    pub author_name: Option<String>,
    #[serde(default)]
    pub is_published: Option<bool>,
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub user_params: String,
    #[serde(default)]
    pub ai_tunables: String,
    #[serde(default)]
    pub helpers: String,
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub helper_snippet_ids: Vec<DbId>,
}

/// DTO for updating a template. Section edits produce a new version;
/// omitted fields fall back to the latest version's text.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub author_name: Option<String>,
    pub is_published: Option<bool>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub user_params: Option<String>,
    pub ai_tunables: Option<String>,
    pub helpers: Option<String>,
    pub main: Option<String>,
    pub helper_snippet_ids: Option<Vec<DbId>>,
}

/// Resolved values for inserting a version row (sections already merged
/// with the previous version, compiled text already computed).
#[derive(Debug, Clone)]
pub struct NewVersion {
    pub parent_version_id: Option<DbId>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub user_params: String,
    pub ai_tunables: String,
    pub helpers: String,
    pub main: String,
    pub compiled: String,
    pub snippet_ids: Vec<DbId>,
}

/// Resolved template metadata for an update (no optionality left — the
/// handler has already merged the request with the existing row).
#[derive(Debug, Clone)]
pub struct TemplateMetaUpdate {
    pub name: String,
    pub description: Option<String>,
    pub author_name: Option<String>,
    pub is_published: bool,
    pub published_at: Option<Timestamp>,
}

/// DTO for creating a new version of an existing template.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVersion {
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub user_params: String,
    #[serde(default)]
    pub ai_tunables: String,
    #[serde(default)]
    pub helpers: String,
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub helper_snippet_ids: Vec<DbId>,
}
