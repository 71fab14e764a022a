//! Verification job orchestration.
//!
//! A job moves `Running -> Done` exactly once. Lookups run sequentially
//! within a job, paced by a [`Pacer`], each bounded by its own timeout. A
//! timeout, transport failure, HTTP error or non-active answer all count as
//! "not confirmed"; nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use massval_core::error::LookupError;
use massval_core::verification::{
    group_by_siret, is_confirmed, progress_percent, JobStatus, JobStore, JobStoreError,
    RegistryStatus, SiretCheck, SiretRegistry,
};

use crate::pacer::Pacer;

/// Pacing and timeout settings for verification jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationConfig {
    /// Minimum delay between two registry calls of the same job.
    pub interval: Duration,
    /// Upper bound for a single registry call.
    pub call_timeout: Duration,
    /// How long a finished job stays pollable.
    pub job_retention: Duration,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            call_timeout: Duration::from_secs(5),
            job_retention: Duration::from_secs(24 * 3600),
        }
    }
}

impl VerificationConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default |
    /// |----------------------------------|---------|
    /// | `VERIFICATION_INTERVAL_MS`       | `100`   |
    /// | `VERIFICATION_CALL_TIMEOUT_SECS` | `5`     |
    /// | `JOB_RETENTION_HOURS`            | `24`    |
    pub fn from_env() -> Self {
        let interval_ms: u64 = std::env::var("VERIFICATION_INTERVAL_MS")
            .unwrap_or_else(|_| "100".into())
            .parse()
            .expect("VERIFICATION_INTERVAL_MS must be a valid u64");

        let call_timeout_secs: u64 = std::env::var("VERIFICATION_CALL_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("VERIFICATION_CALL_TIMEOUT_SECS must be a valid u64");

        let job_retention_hours: u64 = std::env::var("JOB_RETENTION_HOURS")
            .unwrap_or_else(|_| "24".into())
            .parse()
            .expect("JOB_RETENTION_HOURS must be a valid u64");

        Self {
            interval: Duration::from_millis(interval_ms),
            call_timeout: Duration::from_secs(call_timeout_secs),
            job_retention: Duration::from_secs(job_retention_hours * 3600),
        }
    }
}

/// Starts and runs verification jobs.
///
/// Cheaply cloneable; each spawned job holds its own clone.
#[derive(Clone)]
pub struct Verifier {
    registry: Arc<dyn SiretRegistry>,
    jobs: Arc<dyn JobStore>,
    config: VerificationConfig,
}

impl Verifier {
    pub fn new(
        registry: Arc<dyn SiretRegistry>,
        jobs: Arc<dyn JobStore>,
        config: VerificationConfig,
    ) -> Self {
        Self {
            registry,
            jobs,
            config,
        }
    }

    /// Register a new job at 0% and run it in the background.
    ///
    /// Returns as soon as the job is pollable; the caller never waits for
    /// any registry call.
    pub async fn submit(&self, entries: Vec<SiretCheck>) -> Result<String, JobStoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.jobs.put(JobStatus::running(id.as_str(), 0)).await?;

        let verifier = self.clone();
        let job_id = id.clone();
        tokio::spawn(async move {
            verifier.run(&job_id, entries).await;
        });

        Ok(id)
    }

    /// Run a job to completion and return its terminal status.
    ///
    /// Each distinct siret is looked up once, in order of first appearance.
    /// Progress is written after every lookup but the last; the last write
    /// is the `Done` status with every failing row, sorted by row number.
    pub async fn run(&self, id: &str, entries: Vec<SiretCheck>) -> JobStatus {
        let groups = group_by_siret(entries);
        let total = groups.len();

        tracing::info!(
            job_id = id,
            total,
            interval_ms = self.config.interval.as_millis() as u64,
            "Verification job started",
        );

        let mut pacer = Pacer::new(self.config.interval);
        let mut failures = Vec::new();

        for (processed, (siret, rows)) in groups.into_iter().enumerate() {
            pacer.ready().await;
            if !self.check(id, &siret).await {
                failures.extend(rows);
            }

            let processed = processed + 1;
            if processed < total {
                self.write(JobStatus::running(id, progress_percent(processed, total)))
                    .await;
            }
        }

        failures.sort_by_key(|f: &SiretCheck| f.row_number);
        let status = JobStatus::done(id, failures);
        self.write(status.clone()).await;

        tracing::info!(
            job_id = id,
            total,
            failures = status.failures.len(),
            "Verification job finished",
        );

        status
    }

    /// One bounded lookup, classified with the closed failure policy.
    async fn check(&self, job_id: &str, siret: &str) -> bool {
        let outcome: Result<RegistryStatus, LookupError> =
            match tokio::time::timeout(self.config.call_timeout, self.registry.lookup(siret)).await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(LookupError::Timeout),
            };

        let confirmed = is_confirmed(&outcome);
        match &outcome {
            Ok(_) if confirmed => {
                tracing::debug!(job_id, siret, "Siret confirmed");
            }
            Ok(status) => {
                tracing::warn!(job_id, siret, ?status, "Siret not confirmed");
            }
            Err(e) => {
                tracing::warn!(job_id, siret, error = %e, "Siret lookup failed");
            }
        }
        confirmed
    }

    async fn write(&self, status: JobStatus) {
        let id = status.id.clone();
        if let Err(e) = self.jobs.put(status).await {
            tracing::error!(job_id = %id, error = %e, "Failed to write job status");
        }
    }
}
