use std::path::PathBuf;
use std::time::Duration;

/// Registry connection settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Base URL of the search cluster, without trailing slash.
    pub url: String,
    /// Index holding one document per establishment.
    pub index: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// PEM bundle to trust in addition to the system roots.
    pub ca_cert_path: Option<PathBuf>,
}

impl RegistryConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `REGISTRY_URL`          | `http://localhost:9200` |
    /// | `REGISTRY_INDEX`        | `stocketablissement`    |
    /// | `REGISTRY_TIMEOUT_SECS` | `5`                     |
    /// | `REGISTRY_CA_CERT_PATH` | unset                   |
    pub fn from_env() -> Self {
        let url = std::env::var("REGISTRY_URL")
            .unwrap_or_else(|_| "http://localhost:9200".into())
            .trim_end_matches('/')
            .to_string();

        let index =
            std::env::var("REGISTRY_INDEX").unwrap_or_else(|_| "stocketablissement".into());

        let timeout_secs: u64 = std::env::var("REGISTRY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("REGISTRY_TIMEOUT_SECS must be a valid u64");

        let ca_cert_path = std::env::var("REGISTRY_CA_CERT_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Self {
            url,
            index,
            timeout_secs,
            ca_cert_path,
        }
    }

    /// Settings for a cluster at `url`, everything else at its default.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            index: "stocketablissement".into(),
            timeout_secs: 5,
            ca_cert_path: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn search_url(&self) -> String {
        format!("{}/{}/_search", self.url, self.index)
    }
}
