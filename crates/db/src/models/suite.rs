//! Test-suite models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use rulestudio_core::types::{DbId, Timestamp};

/// A row from the `rule_test_suites` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTestSuite {
    pub id: DbId,
    pub template_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub user_params_override: Option<String>,
    pub ai_tunables_override: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Abbreviated test-case row embedded in suite listings.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteCaseSummary {
    pub id: DbId,
    pub name: String,
    pub expected_action: Option<String>,
}

/// Aggregate counts of the most recent run, embedded in suite listings.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteRunSummary {
    pub id: DbId,
    pub pass_count: i32,
    pub fail_count: i32,
    pub error_count: i32,
    pub total_count: i32,
    pub created_at: Timestamp,
}

/// Suite enriched with its case list and latest run, as listed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteWithDetails {
    #[serde(flatten)]
    pub suite: RuleTestSuite,
    pub test_cases: Vec<SuiteCaseSummary>,
    pub latest_run: Option<SuiteRunSummary>,
}

/// DTO for creating a suite.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSuite {
    pub template_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub user_params_override: Option<String>,
    pub ai_tunables_override: Option<String>,
}

/// DTO for updating a suite. All fields optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSuite {
    pub name: Option<String>,
    pub description: Option<String>,
    pub user_params_override: Option<String>,
    pub ai_tunables_override: Option<String>,
}
