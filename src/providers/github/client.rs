use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::auth::Token;
use crate::error::RunLensError;

use super::types::{WorkflowJob, WorkflowRun};

const PER_PAGE: usize = 100;

/// GitHub API client for fetching one workflow run and its jobs.
#[derive(Clone, Debug)]
pub struct GitHubClient {
    /// HTTP client
    client: reqwest::Client,
    /// Base URL for the GitHub API
    base_url: String,
    /// Repository owner
    owner: String,
    /// Repository name
    repo: String,
}

impl GitHubClient {
    /// Create a new GitHub API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - GitHub API base URL (e.g., "https://api.github.com")
    /// * `owner` - Repository owner/organization
    /// * `repo` - Repository name
    /// * `token` - Optional GitHub personal access token
    ///
    /// # Errors
    ///
    /// Fails when the token contains characters that are not valid in an
    /// HTTP header, or when the HTTP client cannot be constructed.
    pub fn new(base_url: String, owner: String, repo: String, token: Option<Token>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("runlens/", env!("CARGO_PKG_VERSION"))),
        );

        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|e| RunLensError::Config(format!("Invalid API token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| RunLensError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            owner,
            repo,
        })
    }

    /// Fetch a single workflow run.
    ///
    /// When `attempt` is given the attempt-specific endpoint is used, so
    /// timestamps and conclusion describe that attempt rather than the
    /// latest one.
    pub async fn fetch_run(&self, run_id: u64, attempt: Option<u64>) -> Result<WorkflowRun> {
        let url = match attempt {
            Some(attempt) => format!(
                "{}/repos/{}/{}/actions/runs/{}/attempts/{}",
                self.base_url, self.owner, self.repo, run_id, attempt
            ),
            None => format!(
                "{}/repos/{}/{}/actions/runs/{}",
                self.base_url, self.owner, self.repo, run_id
            ),
        };

        let run: WorkflowRun = self.get_json(&url).await?;
        log::debug!("Fetched workflow run {} ({:?})", run.id, run.status);
        Ok(run)
    }

    /// Fetch every job of a workflow run, paging until a short page.
    pub async fn fetch_jobs(&self, run_id: u64, attempt: Option<u64>) -> Result<Vec<WorkflowJob>> {
        let endpoint = match attempt {
            Some(attempt) => format!(
                "{}/repos/{}/{}/actions/runs/{}/attempts/{}/jobs",
                self.base_url, self.owner, self.repo, run_id, attempt
            ),
            None => format!(
                "{}/repos/{}/{}/actions/runs/{}/jobs",
                self.base_url, self.owner, self.repo, run_id
            ),
        };

        let mut jobs = Vec::new();
        let mut page = 1;

        loop {
            let url = format!("{endpoint}?per_page={PER_PAGE}&page={page}");
            let response: JobsPage = self.get_json(&url).await?;
            let fetched = response.jobs.len();
            jobs.extend(response.jobs);

            if fetched < PER_PAGE {
                break;
            }
            page += 1;
        }

        log::debug!("Fetched {} jobs for run {}", jobs.len(), run_id);
        Ok(jobs)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RunLensError::Api(format!("GET {url} returned {status}")).into());
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to decode response from {url}"))
    }
}

/// Response envelope of the paginated jobs endpoint.
#[derive(Deserialize)]
struct JobsPage {
    jobs: Vec<WorkflowJob>,
}
