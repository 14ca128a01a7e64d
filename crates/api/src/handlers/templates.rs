//! Handlers for rule templates and their version history.
//!
//! Every write that touches section content produces a new immutable
//! version whose compiled text is computed here, at creation time. Old
//! versions are never recompiled.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use sqlx::PgPool;

use rulestudio_core::compiler::{compile_template, TemplateSections};
use rulestudio_core::error::CoreError;
use rulestudio_core::slug::unique_slug;
use rulestudio_core::types::DbId;
use rulestudio_db::models::template::{
    CreateTemplate, CreateVersion, NewVersion, Template, TemplateMetaUpdate, TemplateVersion,
    TemplateWithVersion, UpdateTemplate, VersionWithSnippets,
};
use rulestudio_db::repositories::{SnippetRepo, TemplateRepo, VersionRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Full template detail: metadata, current version, and the whole history.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TemplateDetail {
    #[serde(flatten)]
    template: Template,
    current_version: Option<VersionWithSnippets>,
    versions: Vec<VersionWithSnippets>,
}

/// GET /api/v1/templates
///
/// List all templates with their current version, most recently updated
/// first.
pub async fn list_templates(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let templates = TemplateRepo::list(&state.pool).await?;

    let mut items = Vec::with_capacity(templates.len());
    for template in templates {
        let current_version = current_version_of(&state.pool, &template).await?;
        items.push(TemplateWithVersion {
            template,
            current_version,
        });
    }

    Ok(Json(DataResponse { data: items }))
}

/// POST /api/v1/templates
///
/// Create a template together with its first version. The slug is derived
/// from the name plus a random suffix; the compiled text is produced here
/// and stored on the version.
pub async fn create_template(
    State(state): State<AppState>,
    Json(input): Json<CreateTemplate>,
) -> AppResult<impl IntoResponse> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("Template name must not be empty".to_string()).into());
    }

    let snippets = SnippetRepo::find_by_ids(&state.pool, &input.helper_snippet_ids).await?;
    let compiled = compile_template(&TemplateSections {
        user_params: input.user_params.clone(),
        ai_tunables: input.ai_tunables.clone(),
        helpers: input.helpers.clone(),
        helper_snippets: snippets.iter().map(|s| s.code.clone()).collect(),
        main: input.main.clone(),
    });

    let version = NewVersion {
        parent_version_id: None,
        title: input.title.clone(),
        message: input.message.clone(),
        user_params: input.user_params.clone(),
        ai_tunables: input.ai_tunables.clone(),
        helpers: input.helpers.clone(),
        main: input.main.clone(),
        compiled,
        snippet_ids: snippets.iter().map(|s| s.id).collect(),
    };

    let (template, created) = TemplateRepo::create_with_version(
        &state.pool,
        name,
        &unique_slug(name),
        input.description.as_deref(),
        input.author_name.as_deref(),
        input.is_published.unwrap_or(false),
        &version,
    )
    .await?;

    tracing::info!(template_id = template.id, slug = %template.slug, "Template created");

    let current_version = Some(version_with_snippets(&state.pool, created).await?);
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: TemplateWithVersion {
                template,
                current_version,
            },
        }),
    ))
}

/// GET /api/v1/templates/{id}
///
/// Full detail: metadata, current version, and version history
/// (newest first), each version carrying its attached snippets.
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = TemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "template",
            id,
        })?;

    let mut versions = Vec::new();
    for version in VersionRepo::list_for_template(&state.pool, template.id).await? {
        versions.push(version_with_snippets(&state.pool, version).await?);
    }

    let current_version = current_version_of(&state.pool, &template).await?;

    Ok(Json(DataResponse {
        data: TemplateDetail {
            template,
            current_version,
            versions,
        },
    }))
}

/// PUT /api/v1/templates/{id}
///
/// Update metadata and append a new version. Omitted section fields carry
/// over from the latest version; omitted snippet lists carry over the
/// latest version's attachments.
pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTemplate>,
) -> AppResult<impl IntoResponse> {
    let template = TemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "template",
            id,
        })?;

    let latest = VersionRepo::latest_for_template(&state.pool, template.id).await?;

    let carried = |provided: Option<String>, existing: fn(&TemplateVersion) -> &str| {
        provided.unwrap_or_else(|| {
            latest
                .as_ref()
                .map(|v| existing(v).to_string())
                .unwrap_or_default()
        })
    };
    let user_params = carried(input.user_params, |v| &v.user_params);
    let ai_tunables = carried(input.ai_tunables, |v| &v.ai_tunables);
    let helpers = carried(input.helpers, |v| &v.helpers);
    let main = carried(input.main, |v| &v.main);

    let snippet_ids = match input.helper_snippet_ids {
        Some(ids) => ids,
        None => match &latest {
            Some(v) => VersionRepo::snippets_for_version(&state.pool, v.id)
                .await?
                .into_iter()
                .map(|s| s.id)
                .collect(),
            None => Vec::new(),
        },
    };
    let snippets = SnippetRepo::find_by_ids(&state.pool, &snippet_ids).await?;

    let compiled = compile_template(&TemplateSections {
        user_params: user_params.clone(),
        ai_tunables: ai_tunables.clone(),
        helpers: helpers.clone(),
        helper_snippets: snippets.iter().map(|s| s.code.clone()).collect(),
        main: main.clone(),
    });

    let is_published = input.is_published.unwrap_or(template.is_published);
    let published_at = match (template.is_published, is_published) {
        (false, true) => Some(chrono::Utc::now()),
        (_, false) => None,
        (true, true) => template.published_at,
    };

    let (template, created) = TemplateRepo::update_with_version(
        &state.pool,
        template.id,
        &TemplateMetaUpdate {
            name: input.name.unwrap_or(template.name),
            description: input.description.or(template.description),
            author_name: input.author_name.or(template.author_name),
            is_published,
            published_at,
        },
        &NewVersion {
            parent_version_id: latest.map(|v| v.id),
            title: input.title,
            message: input.message,
            user_params,
            ai_tunables,
            helpers,
            main,
            compiled,
            snippet_ids: snippets.iter().map(|s| s.id).collect(),
        },
    )
    .await?;

    let current_version = Some(version_with_snippets(&state.pool, created).await?);
    Ok(Json(DataResponse {
        data: TemplateWithVersion {
            template,
            current_version,
        },
    }))
}

/// DELETE /api/v1/templates/{id}
pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = TemplateRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(CoreError::NotFound {
            entity: "template",
            id,
        }
        .into());
    }

    tracing::info!(template_id = id, "Template deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/templates/{id}/versions
///
/// Version history, newest first.
pub async fn list_versions(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = TemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "template",
            id,
        })?;

    let mut versions = Vec::new();
    for version in VersionRepo::list_for_template(&state.pool, template.id).await? {
        versions.push(version_with_snippets(&state.pool, version).await?);
    }

    Ok(Json(DataResponse { data: versions }))
}

/// POST /api/v1/templates/{id}/versions
///
/// Append a new version without touching template metadata. The new
/// version's parent is the current latest.
pub async fn create_version(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateVersion>,
) -> AppResult<impl IntoResponse> {
    let template = TemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "template",
            id,
        })?;

    let latest = VersionRepo::latest_for_template(&state.pool, template.id).await?;
    let snippets = SnippetRepo::find_by_ids(&state.pool, &input.helper_snippet_ids).await?;

    let compiled = compile_template(&TemplateSections {
        user_params: input.user_params.clone(),
        ai_tunables: input.ai_tunables.clone(),
        helpers: input.helpers.clone(),
        helper_snippets: snippets.iter().map(|s| s.code.clone()).collect(),
        main: input.main.clone(),
    });

    let created = VersionRepo::create(
        &state.pool,
        template.id,
        &NewVersion {
            parent_version_id: latest.map(|v| v.id),
            title: input.title,
            message: input.message,
            user_params: input.user_params,
            ai_tunables: input.ai_tunables,
            helpers: input.helpers,
            main: input.main,
            compiled,
            snippet_ids: snippets.iter().map(|s| s.id).collect(),
        },
    )
    .await?;

    let data = version_with_snippets(&state.pool, created).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// Attach a version's snippets to it.
async fn version_with_snippets(
    pool: &PgPool,
    version: TemplateVersion,
) -> Result<VersionWithSnippets, AppError> {
    let helper_snippets = VersionRepo::snippets_for_version(pool, version.id).await?;
    Ok(VersionWithSnippets {
        version,
        helper_snippets,
    })
}

/// Resolve a template's current version (pointer first, latest as a
/// fallback for rows created before the pointer existed).
async fn current_version_of(
    pool: &PgPool,
    template: &Template,
) -> Result<Option<VersionWithSnippets>, AppError> {
    let version = match template.current_version_id {
        Some(version_id) => VersionRepo::find_by_id(pool, version_id).await?,
        None => VersionRepo::latest_for_template(pool, template.id).await?,
    };

    match version {
        Some(version) => Ok(Some(version_with_snippets(pool, version).await?)),
        None => Ok(None),
    }
}
