//! Integration tests for `/api/v1/imports` and the verification jobs they start.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, post_json, siret, wait_for_job, StaticRegistry};
use serde_json::json;

// ---------------------------------------------------------------------------
// Test: a valid update is accepted, exported, and verified in the background
// ---------------------------------------------------------------------------

#[tokio::test]
async fn valid_update_starts_verification() {
    let sirets = vec![siret(1), siret(2), siret(3)];
    let app = build_test_app(StaticRegistry::with_inactive([siret(2)]));

    let response = post_json(
        app.clone(),
        "/api/v1/imports/update",
        &common::update_workbook(&sirets),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["valid"], true);
    assert!(data.get("errors").is_none());
    assert_eq!(data["export"].as_array().unwrap().len(), 3);
    assert_eq!(data["export"][0]["orgId"], siret(1));
    assert_eq!(data["export"][0]["collectorTypes"], json!([]));
    assert_eq!(data["establishments_delimited"].as_array().unwrap().len(), 4);

    let job_id = data["job_id"].as_str().unwrap();
    let done = wait_for_job(&app, job_id).await;
    assert_eq!(done["data"]["progress"], 100);
    assert_eq!(
        done["data"]["failures"],
        json!([{
            "siret": siret(2),
            "row_number": 2,
            "message": "Ce siret est non diffusible",
        }])
    );
}

// ---------------------------------------------------------------------------
// Test: a valid create submission has no structured export
// ---------------------------------------------------------------------------

#[tokio::test]
async fn valid_create_is_accepted() {
    let app = build_test_app(StaticRegistry::default());

    let response = post_json(
        app.clone(),
        "/api/v1/imports/create",
        &common::create_workbook(10),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["valid"], true);
    assert!(json["data"].get("export").is_none());
    assert_eq!(json["data"]["roles_delimited"].as_array().unwrap().len(), 11);

    let done = wait_for_job(&app, json["data"]["job_id"].as_str().unwrap()).await;
    assert_eq!(done["data"]["failures"], json!([]));
}

// ---------------------------------------------------------------------------
// Test: row errors are returned as data, not as an HTTP error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn row_errors_are_listed_without_starting_a_job() {
    let app = build_test_app(StaticRegistry::default());
    let mut workbook = common::create_workbook(10);
    workbook["sheets"][0]["rows"][3][2] = json!("PRODUCER,COLLECTOR,PLOP");
    workbook["sheets"][1]["rows"][5][2] = json!("MEMBER");
    workbook["sheets"][1]["rows"]
        .as_array_mut()
        .unwrap()
        .push(json!([siret(0), "admin0@example.fr", "MEMBER"]));

    let response = post_json(app, "/api/v1/imports/create", &workbook).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["valid"], false);
    assert!(data.get("job_id").is_none());

    let errors = data["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["tab"], "Établissements");
    assert_eq!(errors[0]["row_number"], 3);
    assert_eq!(errors[0]["field"], "companyTypes");
    assert_eq!(errors[0]["value"], "PRODUCER,COLLECTOR,PLOP");
    assert_eq!(errors[0]["kind"], "field_invalid");
    assert_eq!(errors[1]["tab"], "Rôles");
    assert_eq!(errors[1]["row_number"], 11);
    assert_eq!(errors[1]["kind"], "duplicate_role");
    assert!(errors[1]["message"].as_str().unwrap().contains("dupliqué"));
}

// ---------------------------------------------------------------------------
// Test: batch size failures are 422 with a dedicated code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn too_few_rows_is_unprocessable() {
    let app = build_test_app(StaticRegistry::default());
    let response = post_json(app, "/api/v1/imports/create", &common::create_workbook(9)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_ENOUGH_ROWS");
}

#[tokio::test]
async fn too_many_rows_is_unprocessable() {
    let app = build_test_app(StaticRegistry::default());
    let sirets: Vec<_> = (0..501).map(siret).collect();
    let response = post_json(app, "/api/v1/imports/update", &common::update_workbook(&sirets)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "TOO_MANY_ROWS");
}

// ---------------------------------------------------------------------------
// Test: workbook shape problems are parse errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_workbook_sent_as_update_is_a_parse_error() {
    let app = build_test_app(StaticRegistry::default());
    let response = post_json(app, "/api/v1/imports/update", &common::create_workbook(10)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "PARSE_ERROR");
}

#[tokio::test]
async fn wrong_header_is_a_parse_error() {
    let app = build_test_app(StaticRegistry::default());
    let mut workbook = common::update_workbook(&[siret(1), siret(2), siret(3)]);
    workbook["sheets"][0]["rows"][0][1] = json!("types");

    let response = post_json(app, "/api/v1/imports/update", &workbook).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "PARSE_ERROR");
    assert!(json["error"].as_str().unwrap().contains("etablissements"));
}

// ---------------------------------------------------------------------------
// Test: a body that is not a workbook is a bad request
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let app = build_test_app(StaticRegistry::default());
    let response = post_json(app, "/api/v1/imports/update", &json!({ "sheets": "nope" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}
