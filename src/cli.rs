use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;

use crate::auth::Token;
use crate::config::{Config, OutputFormat};
use crate::output::{
    export_json, print_summary, render_markdown_summary, write_export_files, PhaseProgress,
};
use crate::providers::GitHubProvider;
use crate::telemetry::{build_trace, collect_metrics};

#[derive(Parser)]
#[command(name = "runlens")]
#[command(author, version, about = "CI/CD Run Trace & Metrics Exporter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path; auto-discovers runlens.{toml,json,yaml,yml} when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory to write trace.json and metrics.json into
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Presentation format for stdout
    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Pretty-print JSON output
    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,

    /// File to write a Markdown run summary into
    #[arg(short, long, global = true)]
    markdown: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect one GitHub Actions workflow run
    Github {
        /// Repository in 'owner/repo' format
        #[arg(short = 'R', long)]
        repo: Option<String>,

        /// Workflow run identifier
        #[arg(short, long)]
        run: u64,

        /// Run attempt to collect; the latest attempt when omitted
        #[arg(short, long)]
        attempt: Option<u64>,

        #[arg(short, long, env = "GITHUB_TOKEN")]
        token: Option<String>,

        /// GitHub API base URL, for GitHub Enterprise instances
        #[arg(short, long)]
        url: Option<String>,
    },
}

impl Cli {
    async fn execute_github(
        &self,
        config: &Config,
        repo: Option<&str>,
        run_id: u64,
        attempt: Option<u64>,
        token: Option<&str>,
        url: Option<&str>,
    ) -> Result<()> {
        let repo = repo
            .map(str::to_owned)
            .or_else(|| config.github.repo.clone())
            .context("No repository given; pass --repo or set [github] repo in the config file")?;
        let token = token
            .map(Token::from)
            .or_else(|| config.github.token.as_deref().map(Token::from));
        let base_url = url
            .map(str::to_owned)
            .unwrap_or_else(|| config.github.base_url.clone());

        let format = self.format.unwrap_or(config.output.format);
        let pretty = self.pretty || config.output.pretty;

        info!("Collecting workflow run {run_id} from {repo}");

        let provider = GitHubProvider::new(base_url, repo, token)?;

        // No spinner chrome when stdout carries the JSON document
        let progress = (format != OutputFormat::Json).then(PhaseProgress::start_phase_1);
        let records = provider.collect_run(run_id, attempt).await?;
        let progress = progress.map(PhaseProgress::finish_phase_1_start_phase_2);
        let trace = build_trace(&records.run, &records.tasks)?;
        let progress = progress.map(PhaseProgress::finish_phase_2_start_phase_3);
        let snapshot = collect_metrics(&records.run, &records.tasks)?;
        if let Some(progress) = progress {
            progress.finish_phase_3();
        }

        match format {
            OutputFormat::Summary => print_summary(&snapshot, &trace),
            OutputFormat::Json => {
                export_json(&trace, &snapshot, pretty, &mut std::io::stdout().lock())?;
            }
        }

        // Export failures must not discard an already-collected run
        if let Some(dir) = self.output.clone().or_else(|| config.output.dir.clone()) {
            match write_export_files(&dir, &trace, &snapshot, pretty) {
                Ok(()) => info!("Exports written to: {}", dir.display()),
                Err(err) => warn!("Skipping file export: {err:#}"),
            }
        }

        if let Some(path) = self.markdown.clone().or_else(|| config.output.markdown.clone()) {
            match std::fs::write(&path, render_markdown_summary(&snapshot)) {
                Ok(()) => info!("Markdown summary written to: {}", path.display()),
                Err(err) => warn!("Skipping Markdown summary: {err:#}"),
            }
        }

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match &self.command {
            Commands::Github {
                repo,
                run,
                attempt,
                token,
                url,
            } => {
                self.execute_github(
                    &config,
                    repo.as_deref(),
                    *run,
                    *attempt,
                    token.as_deref(),
                    url.as_deref(),
                )
                .await
            }
        }
    }
}
