//! Repository for the `rule_test_suites` table.

use sqlx::PgPool;

use rulestudio_core::types::DbId;

use crate::models::suite::{
    CreateSuite, RuleTestSuite, SuiteCaseSummary, SuiteRunSummary, UpdateSuite,
};

const COLUMNS: &str = "id, template_id, name, description, \
     user_params_override, ai_tunables_override, created_at, updated_at";

/// Provides CRUD operations for test suites.
pub struct SuiteRepo;

impl SuiteRepo {
    /// Insert a new suite, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSuite) -> Result<RuleTestSuite, sqlx::Error> {
        let query = format!(
            "INSERT INTO rule_test_suites \
                (template_id, name, description, user_params_override, ai_tunables_override) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as(&query)
            .bind(input.template_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.user_params_override)
            .bind(&input.ai_tunables_override)
            .fetch_one(pool)
            .await
    }

    /// Find a suite by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RuleTestSuite>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rule_test_suites WHERE id = $1");
        sqlx::query_as(&query).bind(id).fetch_optional(pool).await
    }

    /// List suites, optionally restricted to one template, newest first.
    pub async fn list(
        pool: &PgPool,
        template_id: Option<DbId>,
    ) -> Result<Vec<RuleTestSuite>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rule_test_suites \
             WHERE ($1::bigint IS NULL OR template_id = $1) \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as(&query)
            .bind(template_id)
            .fetch_all(pool)
            .await
    }

    /// Update a suite. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSuite,
    ) -> Result<Option<RuleTestSuite>, sqlx::Error> {
        let query = format!(
            "UPDATE rule_test_suites SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                user_params_override = COALESCE($4, user_params_override), \
                ai_tunables_override = COALESCE($5, ai_tunables_override), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.user_params_override)
            .bind(&input.ai_tunables_override)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a suite (runs cascade, cases detach). Returns `true` if
    /// a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rule_test_suites WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Abbreviated case rows for a suite listing.
    pub async fn case_summaries(
        pool: &PgPool,
        suite_id: DbId,
    ) -> Result<Vec<SuiteCaseSummary>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, name, expected_action FROM rule_test_cases \
             WHERE suite_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(suite_id)
        .fetch_all(pool)
        .await
    }

    /// Aggregate counts of the suite's most recent run, if any.
    pub async fn latest_run_summary(
        pool: &PgPool,
        suite_id: DbId,
    ) -> Result<Option<SuiteRunSummary>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, pass_count, fail_count, error_count, total_count, created_at \
             FROM rule_test_suite_runs \
             WHERE suite_id = $1 ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(suite_id)
        .fetch_optional(pool)
        .await
    }
}
