use anyhow::{Context, Result};
use std::sync::Arc;

use crate::auth::Token;
use crate::error::RunLensError;
use crate::model::{PipelineRun, RunRecords, Step, Task, Worker};

use super::client::GitHubClient;
use super::types::{WorkflowJob, WorkflowRun, WorkflowStep};

/// Provider for collecting pipeline run records from GitHub Actions.
#[derive(Debug)]
pub struct GitHubProvider {
    /// GitHub API client
    client: Arc<GitHubClient>,
    /// Repository owner
    owner: String,
    /// Repository name
    repo: String,
}

impl GitHubProvider {
    /// Create a new GitHub Actions provider.
    ///
    /// # Arguments
    ///
    /// * `base_url` - GitHub API base URL
    /// * `project_path` - Repository path in format "owner/repo"
    /// * `token` - Optional GitHub personal access token
    ///
    /// # Errors
    ///
    /// Fails when `project_path` is not of the form "owner/repo" or when the
    /// HTTP client cannot be constructed.
    pub fn new(base_url: String, project_path: String, token: Option<Token>) -> Result<Self> {
        let parts: Vec<&str> = project_path.split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            return Err(
                RunLensError::Config("Repository must be in format 'owner/repo'".to_string())
                    .into(),
            );
        }

        let owner = parts[0].to_string();
        let repo = parts[1].to_string();

        let client = GitHubClient::new(base_url, owner.clone(), repo.clone(), token)?;

        Ok(Self {
            client: Arc::new(client),
            owner,
            repo,
        })
    }

    /// Collect one workflow run and its jobs as normalized records.
    ///
    /// Run and jobs are fetched concurrently; the raw API shapes are
    /// translated at this boundary so nothing downstream ever sees GitHub
    /// field names or status vocabulary.
    ///
    /// # Arguments
    ///
    /// * `run_id` - Workflow run identifier
    /// * `attempt` - Specific retry attempt; latest when `None`
    ///
    /// # Errors
    ///
    /// Returns an error when either API request fails or a response cannot
    /// be decoded.
    pub async fn collect_run(&self, run_id: u64, attempt: Option<u64>) -> Result<RunRecords> {
        log::info!(
            "Collecting workflow run {} from {}/{}",
            run_id,
            self.owner,
            self.repo
        );

        let (run, jobs) = futures::future::try_join(
            self.client.fetch_run(run_id, attempt),
            self.client.fetch_jobs(run_id, attempt),
        )
        .await
        .context("Failed to fetch workflow run data")?;

        log::info!(
            "Fetched run `{}` with {} jobs",
            run.name.as_deref().unwrap_or("<unnamed>"),
            jobs.len()
        );

        Ok(RunRecords {
            run: to_run(run),
            tasks: jobs.into_iter().map(to_task).collect(),
        })
    }
}

fn to_run(run: WorkflowRun) -> PipelineRun {
    PipelineRun {
        id: run.id,
        name: run.name,
        run_number: run.run_number,
        attempt: run.run_attempt.unwrap_or(1),
        trigger: run.event,
        ref_name: run.head_branch,
        head_sha: run.head_sha,
        status: run.status,
        conclusion: run.conclusion,
        created_at: run.created_at,
        started_at: run.run_started_at,
        updated_at: run.updated_at,
        url: run.html_url,
    }
}

fn to_task(job: WorkflowJob) -> Task {
    let WorkflowJob {
        id,
        name,
        status,
        conclusion,
        started_at,
        completed_at,
        steps,
        runner_name,
        labels,
        html_url,
    } = job;

    // Worker metadata only exists once a runner picked the job up.
    let worker = runner_name.map(|runner| Worker {
        name: runner,
        labels,
    });

    Task {
        id,
        name,
        status,
        conclusion,
        started_at,
        completed_at,
        worker,
        steps: steps.into_iter().map(to_step).collect(),
        url: html_url,
    }
}

fn to_step(step: WorkflowStep) -> Step {
    Step {
        number: step.number,
        name: step.name,
        status: step.status,
        conclusion: step.conclusion,
        started_at: step.started_at,
        completed_at: step.completed_at,
    }
}
