//! Run-record models: single test runs and suite batch runs. Both tables
//! are append-only; rows are never mutated after creation.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use rulestudio_core::types::{DbId, Timestamp};

/// A row from the `rule_test_runs` table: one execution of one test case.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTestRun {
    pub id: DbId,
    pub template_id: DbId,
    pub template_version_id: DbId,
    pub test_case_id: DbId,
    pub suite_run_id: Option<DbId>,
    pub input_json: String,
    pub expected_action: Option<String>,
    pub expected_description: Option<String>,
    pub actual_action: Option<String>,
    pub actual_description: Option<String>,
    /// JSON-serialized decision trace, `None` when nothing was logged.
    pub actual_reasons: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
}

/// Values for inserting one run record.
#[derive(Debug, Clone)]
pub struct NewTestRun {
    pub template_id: DbId,
    pub template_version_id: DbId,
    pub test_case_id: DbId,
    pub suite_run_id: Option<DbId>,
    pub input_json: String,
    pub expected_action: Option<String>,
    pub expected_description: Option<String>,
    pub actual_action: Option<String>,
    pub actual_description: Option<String>,
    pub actual_reasons: Option<String>,
    pub status: String,
}

/// A row from the `rule_test_suite_runs` table: one batch execution with
/// final aggregate counts and the resolved override snapshot.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTestSuiteRun {
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
}

/// Values for inserting one suite-run record.
#[derive(Debug, Clone)]
pub struct NewSuiteRun {
    pub suite_id: DbId,
    pub template_version_id: DbId,
    pub user_params_snapshot: String,
    pub ai_tunables_snapshot: String,
    pub pass_count: i32,
    pub fail_count: i32,
    pub error_count: i32,
    pub total_count: i32,
}

/// Query filters for listing run records.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunFilter {
    pub template_id: Option<DbId>,
    pub template_version_id: Option<DbId>,
    pub test_case_id: Option<DbId>,
    pub limit: Option<i64>,
}
