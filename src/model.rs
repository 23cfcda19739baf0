use chrono::{DateTime, Utc};

/// A single CI/CD pipeline run as reported by the provider API.
///
/// Raw `status`/`conclusion` strings are carried verbatim; normalization
/// happens in `telemetry::classify` so provider vocabulary never leaks past
/// the fetch boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    /// Provider-assigned run identifier
    pub id: u64,
    /// Pipeline (workflow) name; the API can omit it
    pub name: Option<String>,
    /// Monotonic run number within the pipeline
    pub run_number: u64,
    /// Retry attempt, starting at 1
    pub attempt: u64,
    /// Event that triggered the run (push, pull_request, schedule, ...)
    pub trigger: Option<String>,
    /// Branch or tag the run executed on
    pub ref_name: Option<String>,
    /// Commit revision the run executed on
    pub head_sha: Option<String>,
    /// Raw provider status (queued, in_progress, completed, ...)
    pub status: Option<String>,
    /// Raw provider conclusion; present only once the run finished
    pub conclusion: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    /// Last provider-side update; doubles as the completion timestamp once
    /// the run finished
    pub updated_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
}

impl PipelineRun {
    /// A run counts as finished once the provider reports a terminal status
    /// or attaches a conclusion.
    pub fn is_finished(&self) -> bool {
        self.conclusion.is_some() || self.status.as_deref() == Some("completed")
    }
}

/// A job within exactly one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: u64,
    pub name: String,
    pub status: Option<String>,
    pub conclusion: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Runner metadata; present only once the task was scheduled
    pub worker: Option<Worker>,
    /// Steps in provider-reported order; order is significant
    pub steps: Vec<Step>,
    pub url: Option<String>,
}

impl Task {
    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.conclusion.is_some() || self.status.as_deref() == Some("completed")
    }
}

/// An ordered sub-unit of a task.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// 1-based sequence number within the task
    pub number: u32,
    pub name: String,
    pub status: Option<String>,
    pub conclusion: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Step {
    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.conclusion.is_some() || self.status.as_deref() == Some("completed")
    }
}

/// Runner that executed (or will execute) a task.
#[derive(Debug, Clone, PartialEq)]
pub struct Worker {
    pub name: String,
    pub labels: Vec<String>,
}

/// One run plus its tasks, as handed from a provider to the core.
#[derive(Debug, Clone)]
pub struct RunRecords {
    pub run: PipelineRun,
    pub tasks: Vec<Task>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_run(status: Option<&str>, conclusion: Option<&str>) -> PipelineRun {
        PipelineRun {
            id: 42,
            name: Some("ci".to_string()),
            run_number: 7,
            attempt: 1,
            trigger: Some("push".to_string()),
            ref_name: Some("main".to_string()),
            head_sha: Some("abc1234".to_string()),
            status: status.map(String::from),
            conclusion: conclusion.map(String::from),
            created_at: None,
            started_at: None,
            updated_at: None,
            url: None,
        }
    }

    #[test]
    fn test_run_finished_by_conclusion() {
        assert!(create_run(Some("in_progress"), Some("success")).is_finished());
    }

    #[test]
    fn test_run_finished_by_completed_status() {
        assert!(create_run(Some("completed"), None).is_finished());
    }

    #[test]
    fn test_run_in_flight() {
        assert!(!create_run(Some("in_progress"), None).is_finished());
        assert!(!create_run(None, None).is_finished());
    }
}
