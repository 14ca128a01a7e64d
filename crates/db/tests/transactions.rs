//! Integration tests for the transactional repository flows.

use sqlx::PgPool;

use rulestudio_db::models::run::{NewSuiteRun, NewTestRun};
use rulestudio_db::models::snippet::CreateSnippet;
use rulestudio_db::models::suite::CreateSuite;
use rulestudio_db::models::template::NewVersion;
use rulestudio_db::repositories::{
    SnippetRepo, SuiteRepo, SuiteRunRepo, TemplateRepo, TestCaseRepo, TestRunRepo, VersionRepo,
};

fn new_version(compiled: &str) -> NewVersion {
    NewVersion {
        parent_version_id: None,
        title: None,
        message: None,
        user_params: "reserve_soc = 35".to_string(),
        ai_tunables: String::new(),
        helpers: String::new(),
        main: "action = 'auto'".to_string(),
        compiled: compiled.to_string(),
        snippet_ids: vec![],
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn create_with_version_sets_current_pointer(pool: PgPool) {
    let (template, version) = TemplateRepo::create_with_version(
        &pool,
        "Pointer",
        "pointer-abc123",
        None,
        None,
        false,
        &new_version("# compiled"),
    )
    .await
    .unwrap();

    assert_eq!(template.current_version_id, Some(version.id));

    // The pointer survives a round-trip through the database.
    let reloaded = TemplateRepo::find_by_id(&pool, template.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.current_version_id, Some(version.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_slug_is_a_constraint_violation(pool: PgPool) {
    TemplateRepo::create_with_version(&pool, "A", "same-slug", None, None, false, &new_version("x"))
        .await
        .unwrap();

    let err = TemplateRepo::create_with_version(
        &pool,
        "B",
        "same-slug",
        None,
        None,
        false,
        &new_version("x"),
    )
    .await
    .unwrap_err();

    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.code().as_deref(), Some("23505"));
            assert!(db_err
                .constraint()
                .is_some_and(|c| c.starts_with("uq_")));
        }
        other => panic!("expected a database error, got {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn version_history_is_newest_first(pool: PgPool) {
    let (template, first) = TemplateRepo::create_with_version(
        &pool,
        "History",
        "history-abc123",
        None,
        None,
        false,
        &new_version("v1"),
    )
    .await
    .unwrap();

    let mut second = new_version("v2");
    second.parent_version_id = Some(first.id);
    let second = VersionRepo::create(&pool, template.id, &second).await.unwrap();

    let history = VersionRepo::list_for_template(&pool, template.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, second.id);
    assert_eq!(history[0].parent_version_id, Some(first.id));

    // The pointer followed the newest version.
    let reloaded = TemplateRepo::find_by_id(&pool, template.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.current_version_id, Some(second.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn suite_batch_persists_runs_and_aggregate_together(pool: PgPool) {
    let (template, version) = TemplateRepo::create_with_version(
        &pool,
        "Batch",
        "batch-abc123",
        None,
        None,
        false,
        &new_version("compiled"),
    )
    .await
    .unwrap();

    let suite = SuiteRepo::create(
        &pool,
        &CreateSuite {
            template_id: template.id,
            name: "nightly".to_string(),
            description: None,
            user_params_override: None,
            ai_tunables_override: None,
        },
    )
    .await
    .unwrap();

    let mut runs = Vec::new();
    for (name, status) in [("a", "pass"), ("b", "fail"), ("c", "error")] {
        let case = TestCaseRepo::create(
            &pool,
            template.id,
            version.id,
            Some(suite.id),
            name,
            "{}",
            Some("charge"),
            None,
        )
        .await
        .unwrap();

        runs.push(NewTestRun {
            template_id: template.id,
            template_version_id: version.id,
            test_case_id: case.id,
            suite_run_id: None,
            input_json: "{}".to_string(),
            expected_action: Some("charge".to_string()),
            expected_description: None,
            actual_action: Some("charge".to_string()),
            actual_description: None,
            actual_reasons: None,
            status: status.to_string(),
        });
    }

    let (batch, created) = SuiteRunRepo::create_batch(
        &pool,
        &NewSuiteRun {
            suite_id: suite.id,
            template_version_id: version.id,
            user_params_snapshot: "reserve_soc = 35".to_string(),
            ai_tunables_snapshot: String::new(),
            pass_count: 1,
            fail_count: 1,
            error_count: 1,
            total_count: 3,
        },
        &runs,
    )
    .await
    .unwrap();

    assert_eq!(batch.total_count, 3);
    assert_eq!(created.len(), 3);
    assert!(created.iter().all(|r| r.suite_run_id == Some(batch.id)));

    // Everything is visible through the normal read paths.
    let listed = TestRunRepo::list_for_suite_run(&pool, batch.id).await.unwrap();
    assert_eq!(listed.len(), 3);

    let summary = SuiteRepo::latest_run_summary(&pool, suite.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.id, batch.id);
    assert_eq!(summary.pass_count, 1);
}

fn new_snippet(name: &str, rating: Option<i16>) -> CreateSnippet {
    CreateSnippet {
        name: name.to_string(),
        description: None,
        code: "def helper():\n    pass".to_string(),
        tags: vec![],
        is_published: None,
        author_name: Some("fay".to_string()),
        rating,
        comment: rating.map(|_| "solid".to_string()),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn snippet_and_inline_review_commit_together(pool: PgPool) {
    let snippet = SnippetRepo::create(&pool, &new_snippet("clamp", Some(4)))
        .await
        .unwrap();

    let reviews = SnippetRepo::reviews_for(&pool, snippet.id).await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].rating, 4);
    assert_eq!(reviews[0].author_name.as_deref(), Some("fay"));
}

#[sqlx::test(migrations = "./migrations")]
async fn rejected_inline_review_rolls_back_the_snippet(pool: PgPool) {
    // Rating violates the 1-5 check constraint, so the review insert fails
    // after the snippet row was already written inside the transaction.
    let err = SnippetRepo::create(&pool, &new_snippet("orphan", Some(9)))
        .await
        .unwrap_err();
    assert!(matches!(err, sqlx::Error::Database(_)));

    let snippets = SnippetRepo::list(&pool, Some("orphan")).await.unwrap();
    assert!(snippets.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn deleting_suite_detaches_cases(pool: PgPool) {
    let (template, version) = TemplateRepo::create_with_version(
        &pool,
        "Detach",
        "detach-abc123",
        None,
        None,
        false,
        &new_version("compiled"),
    )
    .await
    .unwrap();

    let suite = SuiteRepo::create(
        &pool,
        &CreateSuite {
            template_id: template.id,
            name: "short-lived".to_string(),
            description: None,
            user_params_override: None,
            ai_tunables_override: None,
        },
    )
    .await
    .unwrap();

    let case = TestCaseRepo::create(
        &pool,
        template.id,
        version.id,
        Some(suite.id),
        "survivor",
        "{}",
        None,
        None,
    )
    .await
    .unwrap();

    assert!(SuiteRepo::delete(&pool, suite.id).await.unwrap());

    // The case survives with its suite reference cleared.
    let reloaded = TestCaseRepo::find_by_id(&pool, case.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.suite_id, None);
}
