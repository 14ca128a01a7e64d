//! HTTP-level integration tests for the compile and validation endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post_json};
use serde_json::json;
use sqlx::PgPool;

use rulestudio_core::compiler::{
    HEADER_AI_TUNABLES, HEADER_HELPERS, HEADER_MAIN, HEADER_USER_PARAMS, SECTION_HEADERS,
};

#[sqlx::test(migrations = "../db/migrations")]
async fn compile_assembles_unsaved_sections(pool: PgPool) {
    let response = post_json(
        build_test_app(pool),
        "/api/v1/compile",
        json!({
            "userParams": "reserve_soc = 35",
            "aiTunables": "buy_threshold = 10",
            "helpers": "def clamp(v):\n    return v",
            "main": "action = 'auto'",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let compiled = body["data"]["compiled"].as_str().unwrap();

    // Every section header appears exactly once, in canonical order.
    let mut last = 0;
    for header in SECTION_HEADERS {
        assert_eq!(compiled.matches(header).count(), 1, "header {header}");
        let at = compiled.find(header).unwrap();
        assert!(at >= last, "header {header} out of order");
        last = at;
    }

    let params_at = compiled.find("reserve_soc = 35").unwrap();
    assert!(params_at > compiled.find(HEADER_USER_PARAMS).unwrap());
    assert!(params_at < compiled.find(HEADER_AI_TUNABLES).unwrap());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn compile_includes_referenced_snippets(pool: PgPool) {
    let created = post_json(
        build_test_app(pool.clone()),
        "/api/v1/snippets",
        json!({
            "name": "cheap window",
            "code": "def cheap_window(prices):\n    return min(prices)",
        }),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let snippet_id = body_json(created).await["data"]["id"].as_i64().unwrap();

    let response = post_json(
        build_test_app(pool),
        "/api/v1/compile",
        json!({
            "main": "action = 'auto'",
            "helperSnippetIds": [snippet_id],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let compiled = body["data"]["compiled"].as_str().unwrap();

    let snippet_at = compiled.find("def cheap_window").unwrap();
    assert!(snippet_at > compiled.find(HEADER_HELPERS).unwrap());
    assert!(snippet_at < compiled.find(HEADER_MAIN).unwrap());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn validate_without_api_key_is_rejected(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/validate",
        json!({
            "main": "action = 'auto'",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(body["error"], "POWSTON_API_KEY is not set in the environment");

    // Compiling for validation never stores anything.
    let templates = body_json(get(build_test_app(pool), "/api/v1/templates").await).await;
    assert_eq!(templates["data"].as_array().unwrap().len(), 0);
}
