//! Repository for the `rule_test_suite_runs` table.

use sqlx::PgPool;

use rulestudio_core::types::DbId;

use crate::models::run::{NewSuiteRun, NewTestRun, RuleTestRun, RuleTestSuiteRun};
use crate::repositories::test_run_repo::TestRunRepo;

const COLUMNS: &str = "id, suite_id, template_version_id, \
     user_params_snapshot, ai_tunables_snapshot, \
     pass_count, fail_count, error_count, total_count, created_at";

/// Provides insert/list operations for suite batch records.
pub struct SuiteRunRepo;

impl SuiteRunRepo {
    /// Persist a finished batch: the aggregate record and every individual
    /// run record commit in one transaction, so the counts can never be
    /// observed without the runs they summarize (or vice versa).
    ///
    /// Runs are inserted in slice order; each gets the new batch's ID.
    pub async fn create_batch(
        pool: &PgPool,
        suite_run: &NewSuiteRun,
        runs: &[NewTestRun],
    ) -> Result<(RuleTestSuiteRun, Vec<RuleTestRun>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO rule_test_suite_runs \
                (suite_id, template_version_id, user_params_snapshot, ai_tunables_snapshot, \
                 pass_count, fail_count, error_count, total_count) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let batch: RuleTestSuiteRun = sqlx::query_as(&query)
            .bind(suite_run.suite_id)
            .bind(suite_run.template_version_id)
            .bind(&suite_run.user_params_snapshot)
            .bind(&suite_run.ai_tunables_snapshot)
            .bind(suite_run.pass_count)
            .bind(suite_run.fail_count)
            .bind(suite_run.error_count)
            .bind(suite_run.total_count)
            .fetch_one(&mut *tx)
            .await?;

        let mut created = Vec::with_capacity(runs.len());
        for run in runs {
            let run = NewTestRun {
                suite_run_id: Some(batch.id),
                ..run.clone()
            };
            created.push(TestRunRepo::insert_in_tx(&mut tx, &run).await?);
        }

        tx.commit().await?;
        Ok((batch, created))
    }

    /// Find a batch record by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RuleTestSuiteRun>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rule_test_suite_runs WHERE id = $1");
        sqlx::query_as(&query).bind(id).fetch_optional(pool).await
    }

    /// List batch records, optionally restricted to one suite, newest first.
    pub async fn list(
        pool: &PgPool,
        suite_id: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<RuleTestSuiteRun>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rule_test_suite_runs \
             WHERE ($1::bigint IS NULL OR suite_id = $1) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as(&query)
            .bind(suite_id)
            .bind(limit.clamp(1, 200))
            .fetch_all(pool)
            .await
    }
}
