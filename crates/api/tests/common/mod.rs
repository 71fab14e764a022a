#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use massval_api::config::ServerConfig;
use massval_api::router::build_app_router;
use massval_api::state::AppState;
use massval_core::error::LookupError;
use massval_core::fields;
use massval_core::verification::{RegistryStatus, SiretRegistry};
use massval_pipeline::{InMemoryJobStore, VerificationConfig, Verifier};
use massval_registry::RegistryConfig;

/// Registry double: every siret is active except the listed ones.
#[derive(Default)]
pub struct StaticRegistry {
    inactive: HashSet<String>,
}

impl StaticRegistry {
    pub fn with_inactive<I: IntoIterator<Item = String>>(sirets: I) -> Self {
        Self {
            inactive: sirets.into_iter().collect(),
        }
    }
}

#[async_trait]
impl SiretRegistry for StaticRegistry {
    async fn lookup(&self, siret: &str) -> Result<RegistryStatus, LookupError> {
        if self.inactive.contains(siret) {
            Ok(RegistryStatus::Inactive)
        } else {
            Ok(RegistryStatus::Active)
        }
    }
}

/// Build a test `ServerConfig` with safe defaults and no verification pacing.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        registry: RegistryConfig::with_url("http://localhost:9200"),
        verification: VerificationConfig {
            interval: Duration::ZERO,
            call_timeout: Duration::from_secs(1),
            ..VerificationConfig::default()
        },
    }
}

/// Build the full application router against the given registry double.
pub fn build_test_app(registry: StaticRegistry) -> Router {
    let config = test_config();
    let jobs = Arc::new(InMemoryJobStore::new());
    let verifier = Verifier::new(Arc::new(registry), jobs.clone(), config.verification.clone());
    let state = AppState {
        config: Arc::new(config.clone()),
        jobs,
        verifier,
    };
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll `/api/v1/jobs/{id}` until the job is done.
pub async fn wait_for_job(app: &Router, id: &str) -> Value {
    let uri = format!("/api/v1/jobs/{id}");
    for _ in 0..200 {
        let response = get(app.clone(), &uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        if json["data"]["state"] == "done" {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {id} did not finish");
}

// ---------------------------------------------------------------------------
// Workbook builders
// ---------------------------------------------------------------------------

pub fn siret(i: usize) -> String {
    format!("{:014}", 40_000_000_000_000_u64 + i as u64)
}

fn header(names: &[&str]) -> Value {
    json!(names)
}

/// Update workbook with one `PRODUCER` row per siret.
pub fn update_workbook(sirets: &[String]) -> Value {
    let mut rows = vec![header(fields::ESTABLISHMENTS_UPDATE_FIELDS)];
    rows.extend(sirets.iter().map(|s| json!([s, "PRODUCER"])));
    json!({ "sheets": [{ "name": "etablissements", "rows": rows }] })
}

/// Create workbook with `count` establishments, each with one admin.
pub fn create_workbook(count: usize) -> Value {
    let mut establishments = vec![header(fields::ESTABLISHMENTS_CREATE_FIELDS)];
    let mut roles = vec![header(fields::ROLES_FIELDS)];
    for i in 0..count {
        establishments.push(json!([
            siret(i), "", "PRODUCER,COLLECTOR", "DEEE_WASTES", "", "",
            format!("Site {i}"), "", "06 12 34 56 78", "", ""
        ]));
        roles.push(json!([siret(i), format!("admin{i}@example.fr"), "ADMIN"]));
    }
    json!({
        "sheets": [
            { "name": "etablissements", "rows": establishments },
            { "name": "roles", "rows": roles },
        ]
    })
}
