//! Template execution engine.
//!
//! Runs single test cases and whole suites against compiled templates via
//! the Python harness, derives a status per run, and persists the results.
//!
//! Suite runs execute strictly sequentially against one compiled text and
//! persist nothing until every case has finished; the aggregate row and all
//! per-case rows then commit in a single transaction.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;

use rulestudio_core::compiler::{compile_template, TemplateSections};
use rulestudio_core::error::CoreError;
use rulestudio_core::overrides::resolve_override;
use rulestudio_core::runner::{derive_status, run_script, RunOutcome, RunStatus};
use rulestudio_core::types::{DbId, Timestamp};
use rulestudio_db::models::run::{NewSuiteRun, NewTestRun, RuleTestRun};
use rulestudio_db::models::test_case::RuleTestCase;
use rulestudio_db::repositories::{
    SuiteRepo, SuiteRunRepo, TestCaseRepo, TestRunRepo, VersionRepo,
};

use crate::error::{AppError, AppResult};

/// Request body for `POST /api/v1/suites/run`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSuiteRequest {
    pub suite_id: DbId,
    pub template_version_id: DbId,
    /// Per-run USER PARAMS override; takes precedence over the suite's own
    /// override and the version default.
    pub user_params_override: Option<String>,
    /// Per-run AI TUNABLES override, same precedence.
    pub ai_tunables_override: Option<String>,
}

/// One persisted run inside a suite report, labeled with the case name.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteCaseResult {
    #[serde(flatten)]
    pub run: RuleTestRun,
    pub test_case_name: String,
}

/// Full response for a suite run: the aggregate row plus each case result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteRunReport {
    pub id: DbId,
    pub suite_id: DbId,
    pub template_version_id: DbId,
    pub user_params_snapshot: String,
    pub ai_tunables_snapshot: String,
    pub pass_count: i32,
    pub fail_count: i32,
    pub error_count: i32,
    pub total_count: i32,
    pub created_at: Timestamp,
    pub runs: Vec<SuiteCaseResult>,
}

/// The pre-persistence result of executing one case.
struct CaseExecution {
    input_json: String,
    actual_action: Option<String>,
    actual_description: Option<String>,
    actual_reasons: Option<String>,
    status: RunStatus,
}

/// Executes compiled templates and records runs.
pub struct RunEngine {
    pool: PgPool,
    run_timeout: Duration,
}

impl RunEngine {
    pub fn new(pool: PgPool, run_timeout: Duration) -> Self {
        Self { pool, run_timeout }
    }

    /// Run a single test case against its version's stored compiled text,
    /// optionally merging `overrides` over the case's input, and persist
    /// the run.
    ///
    /// A script exception or bridge failure is recorded as an `error` run,
    /// not surfaced as an HTTP error.
    pub async fn run_test_case(
        &self,
        test_case_id: DbId,
        overrides: Option<&serde_json::Map<String, Value>>,
    ) -> AppResult<RuleTestRun> {
        let case = TestCaseRepo::find_by_id(&self.pool, test_case_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "test case",
                id: test_case_id,
            })?;

        let mut input = parse_case_input(&case.input_json).map_err(AppError::BadRequest)?;
        if let (Value::Object(base), Some(extra)) = (&mut input, overrides) {
            for (key, value) in extra {
                base.insert(key.clone(), value.clone());
            }
        }

        let version = VersionRepo::find_by_id(&self.pool, case.template_version_id).await?;
        let compiled = version
            .as_ref()
            .map(|v| v.compiled.as_str())
            .filter(|c| !c.trim().is_empty());

        let exec = match compiled {
            Some(compiled) => {
                let outcome = run_script(compiled, &input, self.run_timeout).await;
                execution_from_outcome(&case, &input, outcome)
            }
            None => missing_compiled_execution(&case, &input),
        };

        let run = TestRunRepo::insert(
            &self.pool,
            &NewTestRun {
                template_id: case.template_id,
                template_version_id: case.template_version_id,
                test_case_id: case.id,
                suite_run_id: None,
                input_json: exec.input_json,
                expected_action: case.expected_action.clone(),
                expected_description: case.expected_description.clone(),
                actual_action: exec.actual_action,
                actual_description: exec.actual_description,
                actual_reasons: exec.actual_reasons,
                status: exec.status.as_str().to_string(),
            },
        )
        .await?;

        Ok(run)
    }

    /// Run every case in a suite against a freshly compiled script.
    ///
    /// Overrides resolve per field: request body, then the suite's stored
    /// override, then the version default. The compiled text is built once
    /// and shared by all cases. An empty suite is rejected up front and
    /// nothing is persisted.
    pub async fn run_suite(&self, req: &RunSuiteRequest) -> AppResult<SuiteRunReport> {
        let suite = SuiteRepo::find_by_id(&self.pool, req.suite_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "test suite",
                id: req.suite_id,
            })?;

        let cases = TestCaseRepo::list_for_suite(&self.pool, suite.id).await?;
        if cases.is_empty() {
            return Err(AppError::BadRequest(
                "Suite has no test cases".to_string(),
            ));
        }

        let version = VersionRepo::find_by_id(&self.pool, req.template_version_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "template version",
                id: req.template_version_id,
            })?;

        let user_params = resolve_override(
            req.user_params_override.as_deref(),
            suite.user_params_override.as_deref(),
            &version.user_params,
        )
        .to_string();
        let ai_tunables = resolve_override(
            req.ai_tunables_override.as_deref(),
            suite.ai_tunables_override.as_deref(),
            &version.ai_tunables,
        )
        .to_string();

        let snippets = VersionRepo::snippets_for_version(&self.pool, version.id).await?;
        let compiled = compile_template(&TemplateSections {
            user_params: user_params.clone(),
            ai_tunables: ai_tunables.clone(),
            helpers: version.helpers.clone(),
            helper_snippets: snippets.into_iter().map(|s| s.code).collect(),
            main: version.main.clone(),
        });

        tracing::info!(
            suite_id = suite.id,
            version_id = version.id,
            cases = cases.len(),
            "Starting suite run"
        );

        let mut executions = Vec::with_capacity(cases.len());
        for case in &cases {
            let exec = match parse_case_input(&case.input_json) {
                Ok(input) => {
                    let outcome = run_script(&compiled, &input, self.run_timeout).await;
                    execution_from_outcome(case, &input, outcome)
                }
                // A case whose stored input no longer parses is recorded as
                // an error run rather than aborting the whole suite.
                Err(msg) => CaseExecution {
                    input_json: case.input_json.clone(),
                    actual_action: None,
                    actual_description: Some(msg),
                    actual_reasons: None,
                    status: RunStatus::Error,
                },
            };
            executions.push(exec);
        }

        let mut pass_count = 0;
        let mut fail_count = 0;
        let mut error_count = 0;
        for exec in &executions {
            match exec.status {
                RunStatus::Pass => pass_count += 1,
                RunStatus::Fail => fail_count += 1,
                RunStatus::Error => error_count += 1,
                RunStatus::Pending => {}
            }
        }

        let new_runs: Vec<NewTestRun> = cases
            .iter()
            .zip(executions)
            .map(|(case, exec)| NewTestRun {
                template_id: case.template_id,
                template_version_id: version.id,
                test_case_id: case.id,
                suite_run_id: None,
                input_json: exec.input_json,
                expected_action: case.expected_action.clone(),
                expected_description: case.expected_description.clone(),
                actual_action: exec.actual_action,
                actual_description: exec.actual_description,
                actual_reasons: exec.actual_reasons,
                status: exec.status.as_str().to_string(),
            })
            .collect();

        let (batch, runs) = SuiteRunRepo::create_batch(
            &self.pool,
            &NewSuiteRun {
                suite_id: suite.id,
                template_version_id: version.id,
                user_params_snapshot: user_params,
                ai_tunables_snapshot: ai_tunables,
                pass_count,
                fail_count,
                error_count,
                total_count: cases.len() as i32,
            },
            &new_runs,
        )
        .await?;

        tracing::info!(
            suite_run_id = batch.id,
            pass = batch.pass_count,
            fail = batch.fail_count,
            error = batch.error_count,
            "Suite run persisted"
        );

        let runs = runs
            .into_iter()
            .zip(cases)
            .map(|(run, case)| SuiteCaseResult {
                run,
                test_case_name: case.name,
            })
            .collect();

        Ok(SuiteRunReport {
            id: batch.id,
            suite_id: batch.suite_id,
            template_version_id: batch.template_version_id,
            user_params_snapshot: batch.user_params_snapshot,
            ai_tunables_snapshot: batch.ai_tunables_snapshot,
            pass_count: batch.pass_count,
            fail_count: batch.fail_count,
            error_count: batch.error_count,
            total_count: batch.total_count,
            created_at: batch.created_at,
            runs,
        })
    }
}

/// Parse a stored case input, treating an empty string as `{}`.
fn parse_case_input(raw: &str) -> Result<Value, String> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(raw).map_err(|e| format!("Test case input is not valid JSON: {e}"))
}

/// Fold a harness outcome into the fields persisted on the run row.
fn execution_from_outcome(case: &RuleTestCase, input: &Value, outcome: RunOutcome) -> CaseExecution {
    let actual_reasons = if outcome.decisions.reasons.is_empty() {
        None
    } else {
        serde_json::to_string(&outcome.decisions.reasons).ok()
    };

    // A script exception lands in `error`; store it as the description so
    // the studio can show the traceback alongside the run.
    let actual_description = if outcome.success {
        outcome.description
    } else {
        outcome.error
    };

    let status = derive_status(
        case.expected_action.as_deref(),
        case.expected_description.as_deref(),
        outcome.success,
        outcome.action.as_deref(),
        actual_description.as_deref(),
    );

    CaseExecution {
        input_json: serde_json::to_string(input).unwrap_or_else(|_| "{}".to_string()),
        actual_action: outcome.action,
        actual_description,
        actual_reasons,
        status,
    }
}

/// Build the error-run record for a version with no compiled text.
fn missing_compiled_execution(case: &RuleTestCase, input: &Value) -> CaseExecution {
    CaseExecution {
        input_json: serde_json::to_string(input).unwrap_or_else(|_| "{}".to_string()),
        actual_action: None,
        actual_description: Some(
            "No compiled template found for this version.".to_string(),
        ),
        actual_reasons: None,
        status: RunStatus::Error,
    }
}
