//! Compile-only and validation-proxy handlers.
//!
//! Both accept raw section texts (plus snippet ids) so the studio can
//! compile or validate unsaved editor content. `/validate` additionally
//! accepts an already-compiled script and skips recompilation.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use rulestudio_core::compiler::{compile_template, TemplateSections};
use rulestudio_core::types::DbId;
use rulestudio_core::validation::{attribute_findings, AttributedFinding};
use rulestudio_db::repositories::SnippetRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /compile` and `POST /validate`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest {
    /// Pre-compiled script; when present, `/validate` uses it as-is.
    pub compiled: Option<String>,
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

#[derive(Debug, Serialize)]
struct CompileResponse {
    compiled: String,
}

#[derive(Debug, Serialize)]
struct ValidateResponse {
    ok: bool,
    message: String,
    /// Findings attributed to the section their line falls in.
    findings: Vec<AttributedFinding>,
    details: Value,
}

/// POST /api/v1/compile
pub async fn compile(
    State(state): State<AppState>,
    Json(input): Json<CompileRequest>,
) -> AppResult<impl IntoResponse> {
    let compiled = compile_request_sections(&state, &input).await?;
    Ok(Json(DataResponse {
        data: CompileResponse { compiled },
    }))
}

/// POST /api/v1/validate
///
/// Compile (unless a compiled script is provided), forward to the external
/// checker, and map line-numbered findings back onto sections. Checker
/// errors (missing key, upstream failure) come back as a 400 with a
/// distinguishable message.
pub async fn validate(
    State(state): State<AppState>,
    Json(input): Json<CompileRequest>,
) -> AppResult<impl IntoResponse> {
    let compiled = match input.compiled.clone() {
        Some(compiled) => compiled,
        None => compile_request_sections(&state, &input).await?,
    };

    let report = state
        .validator
        .check_code(&compiled)
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let message = report
        .message
        .unwrap_or_else(|| "Validation complete.".to_string());
    let findings = attribute_findings(&compiled, report.findings);

    Ok(Json(DataResponse {
        data: ValidateResponse {
            ok: findings.is_empty(),
            message,
            findings,
            details: report.details,
        },
    }))
}

async fn compile_request_sections(
    state: &AppState,
    input: &CompileRequest,
) -> Result<String, AppError> {
    let snippets = SnippetRepo::find_by_ids(&state.pool, &input.helper_snippet_ids).await?;

    Ok(compile_template(&TemplateSections {
        user_params: input.user_params.clone(),
        ai_tunables: input.ai_tunables.clone(),
        helpers: input.helpers.clone(),
        helper_snippets: snippets.into_iter().map(|s| s.code).collect(),
        main: input.main.clone(),
    }))
}
