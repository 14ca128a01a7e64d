//! Repository for the `rule_test_cases` table.

use sqlx::PgPool;

use rulestudio_core::types::DbId;

use crate::models::test_case::{RuleTestCase, TestCaseFilter};

const COLUMNS: &str = "id, template_id, template_version_id, suite_id, name, \
     input_json, expected_action, expected_description, created_at";

/// Provides CRUD operations for test cases.
pub struct TestCaseRepo;

impl TestCaseRepo {
    /// Insert a new test case (input already serialized by the handler).
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        template_id: DbId,
        template_version_id: DbId,
        suite_id: Option<DbId>,
        name: &str,
        input_json: &str,
        expected_action: Option<&str>,
        expected_description: Option<&str>,
    ) -> Result<RuleTestCase, sqlx::Error> {
        let query = format!(
            "INSERT INTO rule_test_cases \
                (template_id, template_version_id, suite_id, name, input_json, \
                 expected_action, expected_description) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as(&query)
            .bind(template_id)
            .bind(template_version_id)
            .bind(suite_id)
            .bind(name)
            .bind(input_json)
            .bind(expected_action)
            .bind(expected_description)
            .fetch_one(pool)
            .await
    }

    /// Find a test case by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RuleTestCase>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rule_test_cases WHERE id = $1");
        sqlx::query_as(&query).bind(id).fetch_optional(pool).await
    }

    /// List test cases matching the filter, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &TestCaseFilter,
    ) -> Result<Vec<RuleTestCase>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rule_test_cases \
             WHERE ($1::bigint IS NULL OR template_id = $1) \
               AND ($2::bigint IS NULL OR template_version_id = $2) \
               AND ($3::bigint IS NULL OR suite_id = $3) \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as(&query)
            .bind(filter.template_id)
            .bind(filter.template_version_id)
            .bind(filter.suite_id)
            .fetch_all(pool)
            .await
    }

    /// Test cases belonging to a suite, in stored (creation) order — the
    /// order a suite run executes them in.
    pub async fn list_for_suite(
        pool: &PgPool,
        suite_id: DbId,
    ) -> Result<Vec<RuleTestCase>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rule_test_cases \
             WHERE suite_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as(&query).bind(suite_id).fetch_all(pool).await
    }

    /// Hard-delete a test case. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rule_test_cases WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
