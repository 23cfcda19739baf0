use chrono::{DateTime, Utc};
use serde::Deserialize;

/// GitHub Actions workflow run, as returned by `GET .../actions/runs/{id}`.
///
/// Wire shape only; translation into normalized records happens in the
/// provider.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRun {
    /// Unique identifier for the workflow run
    pub id: u64,
    /// Name of the workflow; the API can return null
    pub name: Option<String>,
    /// Monotonic run number
    pub run_number: u64,
    /// Retry attempt of this run
    pub run_attempt: Option<u64>,
    /// Event that triggered the run
    pub event: Option<String>,
    /// Raw status of the run
    pub status: Option<String>,
    /// Raw conclusion of the run (success, failure, ...)
    pub conclusion: Option<String>,
    /// Head branch or tag name
    pub head_branch: Option<String>,
    /// SHA of the head commit
    pub head_sha: Option<String>,
    /// Web URL of the run
    pub html_url: Option<String>,
    /// When the run was created
    pub created_at: Option<DateTime<Utc>>,
    /// When the run was last updated
    pub updated_at: Option<DateTime<Utc>>,
    /// When the run actually started executing
    pub run_started_at: Option<DateTime<Utc>>,
}

/// Job within a workflow run; the jobs endpoint inlines its steps.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowJob {
    /// Unique identifier for the job
    pub id: u64,
    /// Name of the job
    pub name: String,
    /// Raw status of the job
    pub status: Option<String>,
    /// Raw conclusion of the job
    pub conclusion: Option<String>,
    /// When the job started
    pub started_at: Option<DateTime<Utc>>,
    /// When the job completed
    pub completed_at: Option<DateTime<Utc>>,
    /// Steps in this job, in execution order
    #[serde(default)]
    pub steps: Vec<WorkflowStep>,
    /// Name of the runner that picked the job up
    pub runner_name: Option<String>,
    /// Labels the job requested from its runner
    #[serde(default)]
    pub labels: Vec<String>,
    /// Web URL of the job
    pub html_url: Option<String>,
}

/// Step within a job.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowStep {
    /// 1-based position within the job
    pub number: u32,
    /// Name of the step
    pub name: String,
    /// Raw status of the step
    pub status: Option<String>,
    /// Raw conclusion of the step
    pub conclusion: Option<String>,
    /// When the step started
    pub started_at: Option<DateTime<Utc>>,
    /// When the step completed
    pub completed_at: Option<DateTime<Utc>>,
}
