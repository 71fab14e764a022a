//! Types shared by the asynchronous registry verification step.
//!
//! The orchestration itself lives in `massval-pipeline`; this module holds the
//! job model, progress arithmetic, failure classification and the two
//! collaborator traits (registry lookup and job store).

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::LookupError;

/// Message shown for every siret the registry did not confirm.
pub const NOT_CONFIRMED_MESSAGE: &str = "Ce siret est non diffusible";

// ---------------------------------------------------------------------------
// Entries and failures
// ---------------------------------------------------------------------------

/// One establishment row to confirm against the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiretCheck {
    pub siret: String,
    pub row_number: usize,
}

impl SiretCheck {
    pub fn new(siret: impl Into<String>, row_number: usize) -> Self {
        Self {
            siret: siret.into(),
            row_number,
        }
    }

    pub fn message(&self) -> &'static str {
        NOT_CONFIRMED_MESSAGE
    }

    pub fn render(&self) -> RenderedFailure {
        RenderedFailure {
            siret: self.siret.clone(),
            row_number: self.row_number,
            message: self.message(),
        }
    }
}

/// Display-ready view of a failed [`SiretCheck`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedFailure {
    pub siret: String,
    pub row_number: usize,
    pub message: &'static str,
}

/// Group entries by siret, keeping first-appearance order.
///
/// Each siret is looked up once; if it fails, every row carrying it is
/// reported.
pub fn group_by_siret(entries: Vec<SiretCheck>) -> IndexMap<String, Vec<SiretCheck>> {
    let mut grouped: IndexMap<String, Vec<SiretCheck>> = IndexMap::new();
    for entry in entries {
        grouped.entry(entry.siret.clone()).or_default().push(entry);
    }
    grouped
}

/// `round(100 * processed / total)` with ties to even; an empty job is
/// complete.
pub fn progress_percent(processed: usize, total: usize) -> u8 {
    if total == 0 || processed >= total {
        return 100;
    }
    let ratio = 100.0 * processed as f64 / total as f64;
    ratio.round_ties_even() as u8
}

// ---------------------------------------------------------------------------
// Job status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Running,
    Done,
}

/// Stored state of one verification job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub id: String,
    pub state: JobState,
    pub progress: u8,
    pub failures: Vec<SiretCheck>,
}

impl JobStatus {
    pub fn running(id: impl Into<String>, progress: u8) -> Self {
        Self {
            id: id.into(),
            state: JobState::Running,
            progress: progress.min(100),
            failures: Vec::new(),
        }
    }

    /// Terminal status; progress is pinned to 100.
    pub fn done(id: impl Into<String>, failures: Vec<SiretCheck>) -> Self {
        Self {
            id: id.into(),
            state: JobState::Done,
            progress: 100,
            failures,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == JobState::Done
    }

    /// What a poller sees. Failures are only exposed once the job is done.
    pub fn poll(&self) -> JobPoll {
        match self.state {
            JobState::Running => JobPoll::Running {
                progress: self.progress,
            },
            JobState::Done => JobPoll::Done {
                progress: 100,
                failures: self.failures.iter().map(SiretCheck::render).collect(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum JobPoll {
    Running {
        progress: u8,
    },
    Done {
        progress: u8,
        failures: Vec<RenderedFailure>,
    },
}

// ---------------------------------------------------------------------------
// Registry lookup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryStatus {
    Active,
    Inactive,
    NotFound,
}

/// Closed failure policy: only a definite `Active` answer confirms a siret.
pub fn is_confirmed(outcome: &Result<RegistryStatus, LookupError>) -> bool {
    matches!(outcome, Ok(RegistryStatus::Active))
}

/// Company registry able to tell whether a siret belongs to an active
/// establishment.
#[async_trait]
pub trait SiretRegistry: Send + Sync {
    async fn lookup(&self, siret: &str) -> Result<RegistryStatus, LookupError>;

    async fn check_exists(&self, siret: &str) -> bool {
        is_confirmed(&self.lookup(siret).await)
    }
}

// ---------------------------------------------------------------------------
// Job store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobStoreError {
    #[error("Job {id} is already done")]
    Finalized { id: String },

    #[error("Job store failure: {0}")]
    Backend(String),
}

/// Key-value store backing job polling.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Write the status under `status.id`. Overwriting a done job fails.
    async fn put(&self, status: JobStatus) -> Result<(), JobStoreError>;

    async fn get(&self, id: &str) -> Result<Option<JobStatus>, JobStoreError>;
}
