//! Handlers for test suites and suite runs.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use rulestudio_core::error::CoreError;
use rulestudio_core::types::DbId;
use rulestudio_db::models::run::{RuleTestRun, RuleTestSuiteRun};
use rulestudio_db::models::suite::{CreateSuite, RuleTestSuite, SuiteWithDetails, UpdateSuite};
use rulestudio_db::repositories::{SuiteRepo, SuiteRunRepo, TemplateRepo, TestRunRepo};

use crate::engine::RunSuiteRequest;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteListParams {
    pub template_id: Option<DbId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteRunListParams {
    pub suite_id: Option<DbId>,
    pub limit: Option<i64>,
}

/// A persisted batch record together with the runs it produced.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SuiteRunWithRuns {
    #[serde(flatten)]
    suite_run: RuleTestSuiteRun,
    runs: Vec<RuleTestRun>,
}

/// GET /api/v1/suites
pub async fn list_suites(
    State(state): State<AppState>,
    Query(params): Query<SuiteListParams>,
) -> AppResult<impl IntoResponse> {
    let suites = SuiteRepo::list(&state.pool, params.template_id).await?;

    let mut items = Vec::with_capacity(suites.len());
    for suite in suites {
        items.push(with_details(&state.pool, suite).await?);
    }

    Ok(Json(DataResponse { data: items }))
}

/// POST /api/v1/suites
pub async fn create_suite(
    State(state): State<AppState>,
    Json(input): Json<CreateSuite>,
) -> AppResult<impl IntoResponse> {
    if input.name.trim().is_empty() {
        return Err(CoreError::Validation("Suite name must not be empty".to_string()).into());
    }

    TemplateRepo::find_by_id(&state.pool, input.template_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "template",
            id: input.template_id,
        })?;

    let suite = SuiteRepo::create(&state.pool, &input).await?;
    tracing::info!(suite_id = suite.id, "Test suite created");

    let data = with_details(&state.pool, suite).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/suites/{id}
pub async fn get_suite(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let suite = SuiteRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "test suite",
            id,
        })?;

    let data = with_details(&state.pool, suite).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/suites/{id}
pub async fn update_suite(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSuite>,
) -> AppResult<impl IntoResponse> {
    let suite = SuiteRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "test suite",
            id,
        })?;

    let data = with_details(&state.pool, suite).await?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/suites/{id}
pub async fn delete_suite(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = SuiteRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(CoreError::NotFound {
            entity: "test suite",
            id,
        }
        .into());
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/suites/run
///
/// Execute every case in the suite and persist the batch. Individual case
/// failures are part of the report, never an HTTP error.
pub async fn run_suite(
    State(state): State<AppState>,
    Json(input): Json<RunSuiteRequest>,
) -> AppResult<impl IntoResponse> {
    let report = state.engine.run_suite(&input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: report })))
}

/// GET /api/v1/suites/runs
///
/// Past batch records with their runs, newest first.
pub async fn list_suite_runs(
    State(state): State<AppState>,
    Query(params): Query<SuiteRunListParams>,
) -> AppResult<impl IntoResponse> {
    let batches =
        SuiteRunRepo::list(&state.pool, params.suite_id, params.limit.unwrap_or(20)).await?;

    let mut items = Vec::with_capacity(batches.len());
    for suite_run in batches {
        let runs = TestRunRepo::list_for_suite_run(&state.pool, suite_run.id).await?;
        items.push(SuiteRunWithRuns { suite_run, runs });
    }

    Ok(Json(DataResponse { data: items }))
}

/// Attach case summaries and the latest run summary to a suite row.
async fn with_details(pool: &PgPool, suite: RuleTestSuite) -> Result<SuiteWithDetails, AppError> {
    let test_cases = SuiteRepo::case_summaries(pool, suite.id).await?;
    let latest_run = SuiteRepo::latest_run_summary(pool, suite.id).await?;

    Ok(SuiteWithDetails {
        suite,
        test_cases,
        latest_run,
    })
}
