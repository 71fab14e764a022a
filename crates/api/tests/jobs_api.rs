//! Integration tests for `/api/v1/jobs`.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, StaticRegistry};

#[tokio::test]
async fn unknown_job_returns_404() {
    let app = build_test_app(StaticRegistry::default());
    let response = get(app, "/api/v1/jobs/does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn finished_job_polls_identically() {
    let app = build_test_app(StaticRegistry::with_inactive([common::siret(1)]));
    let sirets = vec![common::siret(1), common::siret(2), common::siret(3)];
    let response = common::post_json(
        app.clone(),
        "/api/v1/imports/update",
        &common::update_workbook(&sirets),
    )
    .await;
    let json = body_json(response).await;
    let id = json["data"]["job_id"].as_str().unwrap().to_string();

    let first = common::wait_for_job(&app, &id).await;
    let second = body_json(get(app, &format!("/api/v1/jobs/{id}")).await).await;
    assert_eq!(first, second);
    assert_eq!(second["data"]["failures"][0]["row_number"], 1);
}
