//! Handlers for test cases, single-case execution, and run history.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use rulestudio_core::error::CoreError;
use rulestudio_core::types::DbId;
use rulestudio_db::models::run::TestRunFilter;
use rulestudio_db::models::test_case::{CreateTestCase, TestCaseFilter};
use rulestudio_db::repositories::{TemplateRepo, TestCaseRepo, TestRunRepo, VersionRepo};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /api/v1/tests/run`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunTestRequest {
    pub test_case_id: DbId,
    /// Extra input fields merged over the case's stored input for this run
    /// only.
    pub overrides: Option<serde_json::Map<String, serde_json::Value>>,
}

/// GET /api/v1/tests
pub async fn list_test_cases(
    State(state): State<AppState>,
    Query(filter): Query<TestCaseFilter>,
) -> AppResult<impl IntoResponse> {
    let cases = TestCaseRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: cases }))
}

/// POST /api/v1/tests
pub async fn create_test_case(
    State(state): State<AppState>,
    Json(input): Json<CreateTestCase>,
) -> AppResult<impl IntoResponse> {
    if input.name.trim().is_empty() {
        return Err(CoreError::Validation("Test case name must not be empty".to_string()).into());
    }

    TemplateRepo::find_by_id(&state.pool, input.template_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "template",
            id: input.template_id,
        })?;

    let version = VersionRepo::find_by_id(&state.pool, input.template_version_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "template version",
            id: input.template_version_id,
        })?;
    if version.template_id != input.template_id {
        return Err(CoreError::Validation(
            "Template version does not belong to the given template".to_string(),
        )
        .into());
    }

    let input_json = serde_json::to_string(&input.input_json)
        .map_err(|e| CoreError::Validation(format!("Invalid input JSON: {e}")))?;

    let case = TestCaseRepo::create(
        &state.pool,
        input.template_id,
        input.template_version_id,
        input.suite_id,
        &input.name,
        &input_json,
        input.expected_action.as_deref(),
        input.expected_description.as_deref(),
    )
    .await?;

    tracing::info!(test_case_id = case.id, "Test case created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: case })))
}

/// GET /api/v1/tests/{id}
pub async fn get_test_case(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let case = TestCaseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "test case",
            id,
        })?;

    Ok(Json(DataResponse { data: case }))
}

/// DELETE /api/v1/tests/{id}
pub async fn delete_test_case(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = TestCaseRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(CoreError::NotFound {
            entity: "test case",
            id,
        }
        .into());
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/tests/run
///
/// Execute one test case and persist the run. A script exception shows up
/// as a run with `status: "error"`, not as an HTTP error.
pub async fn run_test_case(
    State(state): State<AppState>,
    Json(input): Json<RunTestRequest>,
) -> AppResult<impl IntoResponse> {
    let run = state
        .engine
        .run_test_case(input.test_case_id, input.overrides.as_ref())
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: run })))
}

/// GET /api/v1/tests/runs
///
/// Run history, newest first, filterable by template, version, or case.
pub async fn list_runs(
    State(state): State<AppState>,
    Query(filter): Query<TestRunFilter>,
) -> AppResult<impl IntoResponse> {
    let runs = TestRunRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: runs }))
}
