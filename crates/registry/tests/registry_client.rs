use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use massval_core::error::LookupError;
use massval_core::verification::{RegistryStatus, SiretRegistry};
use massval_registry::{RegistryClient, RegistryConfig};

const SIRET: &str = "12345678901234";

fn search_body(siret: &str) -> serde_json::Value {
    json!({ "query": { "bool": { "must": [{ "match": { "siret": siret } }] } } })
}

fn hits(states: &[&str]) -> serde_json::Value {
    let hits: Vec<_> = states
        .iter()
        .map(|s| json!({ "_source": { "siret": SIRET, "etatAdministratifEtablissement": s } }))
        .collect();
    json!({ "hits": { "total": { "value": hits.len() }, "hits": hits } })
}

fn client_for(server: &MockServer) -> RegistryClient {
    RegistryClient::new(RegistryConfig::with_url(server.uri())).unwrap()
}

#[tokio::test]
async fn active_establishment_is_confirmed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stocketablissement/_search"))
        .and(body_json(search_body(SIRET)))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(&["A"])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.lookup(SIRET).await, Ok(RegistryStatus::Active));
}

#[tokio::test]
async fn closed_establishment_is_not_confirmed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stocketablissement/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(&["F"])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.lookup(SIRET).await, Ok(RegistryStatus::Inactive));
    assert!(!client.check_exists(SIRET).await);
}

#[tokio::test]
async fn unknown_siret_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stocketablissement/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(&[])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.lookup(SIRET).await, Ok(RegistryStatus::NotFound));
}

#[tokio::test]
async fn server_error_is_a_status_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(
        client.lookup(SIRET).await,
        Err(LookupError::Status { status: 500 })
    );
    assert!(!client.check_exists(SIRET).await);
}

#[tokio::test]
async fn malformed_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_matches!(client.lookup(SIRET).await, Err(LookupError::Malformed(_)));
}

#[tokio::test]
async fn slow_registry_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(hits(&["A"]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let client = RegistryClient::with_client(http, RegistryConfig::with_url(server.uri()));
    assert_eq!(client.lookup(SIRET).await, Err(LookupError::Timeout));
    assert!(!client.check_exists(SIRET).await);
}

#[tokio::test]
async fn unreachable_registry_is_a_transport_failure() {
    let client = RegistryClient::new(RegistryConfig::with_url("http://127.0.0.1:9")).unwrap();
    assert_matches!(client.lookup(SIRET).await, Err(LookupError::Transport(_)));
}
