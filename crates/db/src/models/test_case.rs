//! Test-case models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use rulestudio_core::types::{DbId, Timestamp};

/// A row from the `rule_test_cases` table. Independent of any run.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTestCase {
    pub id: DbId,
    pub template_id: DbId,
    pub template_version_id: DbId,
    pub suite_id: Option<DbId>,
    pub name: String,
    /// Serialized JSON object fed to the execution bridge.
    pub input_json: String,
    pub expected_action: Option<String>,
    pub expected_description: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a test case. `input_json` accepts any JSON value and is
/// stored serialized.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestCase {
    pub template_id: DbId,
    pub template_version_id: DbId,
    pub name: String,
    pub input_json: serde_json::Value,
    pub expected_action: Option<String>,
    pub expected_description: Option<String>,
    pub suite_id: Option<DbId>,
}

/// Query filters for listing test cases.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseFilter {
    pub template_id: Option<DbId>,
    pub template_version_id: Option<DbId>,
    pub suite_id: Option<DbId>,
}
