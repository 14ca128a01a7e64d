//! Repository for the `rule_test_runs` table (append-only).

use sqlx::{PgPool, Postgres, Transaction};

use rulestudio_core::types::DbId;

use crate::models::run::{NewTestRun, RuleTestRun, TestRunFilter};

pub(crate) const RUN_COLUMNS: &str = "id, template_id, template_version_id, test_case_id, \
     suite_run_id, input_json, expected_action, expected_description, \
     actual_action, actual_description, actual_reasons, status, created_at";

/// Default cap on run-listing queries.
const DEFAULT_LIMIT: i64 = 50;

/// Provides insert/list operations for individual run records.
pub struct TestRunRepo;

impl TestRunRepo {
    /// Insert one run record.
    pub async fn insert(pool: &PgPool, run: &NewTestRun) -> Result<RuleTestRun, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let created = Self::insert_in_tx(&mut tx, run).await?;
        tx.commit().await?;
        Ok(created)
    }

    /// Insert one run record inside the caller's transaction (suite batches).
    pub(crate) async fn insert_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        run: &NewTestRun,
    ) -> Result<RuleTestRun, sqlx::Error> {
        let query = format!(
            "INSERT INTO rule_test_runs \
                (template_id, template_version_id, test_case_id, suite_run_id, \
                 input_json, expected_action, expected_description, \
                 actual_action, actual_description, actual_reasons, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {RUN_COLUMNS}"
        );
        sqlx::query_as(&query)
            .bind(run.template_id)
            .bind(run.template_version_id)
            .bind(run.test_case_id)
            .bind(run.suite_run_id)
            .bind(&run.input_json)
            .bind(&run.expected_action)
            .bind(&run.expected_description)
            .bind(&run.actual_action)
            .bind(&run.actual_description)
            .bind(&run.actual_reasons)
            .bind(&run.status)
            .fetch_one(&mut **tx)
            .await
    }

    /// List run records matching the filter, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &TestRunFilter,
    ) -> Result<Vec<RuleTestRun>, sqlx::Error> {
        let limit = filter.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 500);
        let query = format!(
            "SELECT {RUN_COLUMNS} FROM rule_test_runs \
             WHERE ($1::bigint IS NULL OR template_id = $1) \
               AND ($2::bigint IS NULL OR template_version_id = $2) \
               AND ($3::bigint IS NULL OR test_case_id = $3) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $4"
        );
        sqlx::query_as(&query)
            .bind(filter.template_id)
            .bind(filter.template_version_id)
            .bind(filter.test_case_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Runs produced by one suite batch, in execution order.
    pub async fn list_for_suite_run(
        pool: &PgPool,
        suite_run_id: DbId,
    ) -> Result<Vec<RuleTestRun>, sqlx::Error> {
        let query = format!(
            "SELECT {RUN_COLUMNS} FROM rule_test_runs \
             WHERE suite_run_id = $1 ORDER BY id ASC"
        );
        sqlx::query_as(&query)
            .bind(suite_run_id)
            .fetch_all(pool)
            .await
    }
}
