//! HTTP client for the establishment search index.
//!
//! A lookup is a single `POST /<index>/_search` with a `match` query on the
//! siret. An establishment is active iff one of the hits carries
//! `etatAdministratifEtablissement == "A"`.

use async_trait::async_trait;
use serde::Deserialize;

use massval_core::error::LookupError;
use massval_core::verification::{RegistryStatus, SiretRegistry};

use crate::config::RegistryConfig;

/// Administrative state value for an open establishment.
const ACTIVE_STATE: &str = "A";

/// HTTP client for one registry cluster.
pub struct RegistryClient {
    client: reqwest::Client,
    config: RegistryConfig,
}

/// Errors from the registry HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The registry returned a non-2xx status code.
    #[error("Registry API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The configured CA bundle could not be loaded.
    #[error("Invalid CA certificate at {path}: {reason}")]
    Certificate { path: String, reason: String },
}

impl From<RegistryError> for LookupError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Request(e) if e.is_timeout() => LookupError::Timeout,
            RegistryError::Request(e) if e.is_decode() => LookupError::Malformed(e.to_string()),
            RegistryError::Request(e) => LookupError::Transport(e.to_string()),
            RegistryError::Api { status, .. } => LookupError::Status { status },
            err @ RegistryError::Certificate { .. } => LookupError::Transport(err.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_source", default)]
    source: Option<EstablishmentDocument>,
}

#[derive(Debug, Deserialize)]
struct EstablishmentDocument {
    #[serde(rename = "etatAdministratifEtablissement")]
    administrative_state: Option<String>,
}

impl SearchResponse {
    fn status(&self) -> RegistryStatus {
        if self.hits.hits.is_empty() {
            return RegistryStatus::NotFound;
        }
        let active = self.hits.hits.iter().any(|hit| {
            hit.source
                .as_ref()
                .and_then(|s| s.administrative_state.as_deref())
                == Some(ACTIVE_STATE)
        });
        if active {
            RegistryStatus::Active
        } else {
            RegistryStatus::Inactive
        }
    }
}

impl RegistryClient {
    /// Build a client with the configured timeout and optional CA bundle.
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout());

        if let Some(path) = &config.ca_cert_path {
            let certificate_error = |reason: String| RegistryError::Certificate {
                path: path.display().to_string(),
                reason,
            };
            let pem = std::fs::read(path).map_err(|e| certificate_error(e.to_string()))?;
            let certificate =
                reqwest::Certificate::from_pem(&pem).map_err(|e| certificate_error(e.to_string()))?;
            builder = builder.add_root_certificate(certificate);
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: RegistryConfig) -> Self {
        Self { client, config }
    }

    /// Query the index for `siret` and classify the answer.
    pub async fn search(&self, siret: &str) -> Result<RegistryStatus, RegistryError> {
        let body = serde_json::json!({
            "query": {
                "bool": {
                    "must": [{ "match": { "siret": siret } }]
                }
            }
        });

        let response = self
            .client
            .post(self.config.search_url())
            .json(&body)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let parsed = response.json::<SearchResponse>().await?;
        Ok(parsed.status())
    }

    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, RegistryError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RegistryError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl SiretRegistry for RegistryClient {
    async fn lookup(&self, siret: &str) -> Result<RegistryStatus, LookupError> {
        let outcome = self.search(siret).await;
        if let Err(e) = &outcome {
            tracing::debug!(siret, error = %e, "Registry lookup failed");
        }
        outcome.map_err(LookupError::from)
    }
}
