use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RunLensError};
use crate::model::{PipelineRun, Step, Task};

use super::classify::{classify_conclusion, infer_task_kind, normalize_status};
use super::classify::{RunResult, TaskKind, TaskStatus};
use super::duration::duration_ms;

/// Where the run is in its lifecycle right now.
///
/// Derived from the run and its current task statuses on every collection;
/// there is no stored state machine to transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Pending,
    Executing,
    Finalizing,
}

impl RunState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Executing => "executing",
            Self::Finalizing => "finalizing",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline identity, serialized under semantic-convention names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineAttributes {
    #[serde(rename = "cicd.pipeline.name")]
    pub name: String,
    #[serde(rename = "cicd.pipeline.run.id")]
    pub run_id: u64,
    #[serde(rename = "cicd.pipeline.run.number")]
    pub run_number: u64,
    #[serde(rename = "cicd.pipeline.run.attempt")]
    pub attempt: u64,
    #[serde(
        rename = "cicd.pipeline.run.trigger",
        skip_serializing_if = "Option::is_none"
    )]
    pub trigger: Option<String>,
    #[serde(rename = "vcs.ref.head.name", skip_serializing_if = "Option::is_none")]
    pub ref_name: Option<String>,
    #[serde(
        rename = "vcs.ref.head.revision",
        skip_serializing_if = "Option::is_none"
    )]
    pub head_sha: Option<String>,
    #[serde(
        rename = "cicd.pipeline.run.url.full",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<String>,
}

/// Runner identity, from the first task that reports one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerAttributes {
    #[serde(rename = "cicd.worker.name")]
    pub name: String,
    #[serde(
        rename = "cicd.worker.labels",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub labels: Vec<String>,
}

/// Task identity, serialized under semantic-convention names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAttributes {
    #[serde(rename = "cicd.pipeline.task.run.id")]
    pub run_id: u64,
    #[serde(rename = "cicd.pipeline.task.name")]
    pub name: String,
    #[serde(rename = "cicd.pipeline.task.type")]
    pub kind: TaskKind,
    #[serde(
        rename = "cicd.pipeline.task.run.url.full",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<String>,
}

/// Per-task rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMetric {
    pub attributes: TaskAttributes,
    pub status: TaskStatus,
    /// `None` while the task runs or when timestamps are missing
    pub duration_ms: Option<u64>,
    /// Step metrics in provider-reported order
    pub steps: Vec<StepMetric>,
}

/// Per-step rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepMetric {
    pub number: u32,
    pub name: String,
    pub status: TaskStatus,
    pub duration_ms: Option<u64>,
}

/// Task totals by normalized status.
///
/// The by-status counts never exceed `total`; the remainder is tasks still
/// waiting to be picked up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounts {
    pub total: u64,
    pub success: u64,
    pub failure: u64,
    pub skipped: u64,
    pub cancelled: u64,
    pub in_progress: u64,
}

impl TaskCounts {
    pub fn queued(&self) -> u64 {
        self.total.saturating_sub(
            self.success + self.failure + self.skipped + self.cancelled + self.in_progress,
        )
    }
}

/// Aggregated view of one pipeline run at one instant.
///
/// A value, not a managed object: built once per collection and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub pipeline: PipelineAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker: Option<WorkerAttributes>,
    pub state: RunState,
    /// Absent until the provider reports the run finished; never guessed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RunResult>,
    /// Wall-clock from run start to last provider update
    pub duration_ms: Option<u64>,
    /// Wall-clock the run spent waiting between creation and start
    pub queue_time_ms: Option<u64>,
    pub task_counts: TaskCounts,
    /// Frequency table: `<kind>_failure` / `cancellation` → occurrence count
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub errors: IndexMap<String, u64>,
    pub tasks: Vec<TaskMetric>,
    pub collected_at: DateTime<Utc>,
}

/// Aggregates one pipeline run and its tasks into a metrics snapshot.
///
/// Missing optional fields degrade to unknown or omitted values; only a run
/// without its pipeline name aborts collection, since a snapshot without an
/// identity is meaningless.
///
/// # Errors
///
/// `MissingRunIdentity` when the run has no pipeline name.
pub fn collect_metrics(run: &PipelineRun, tasks: &[Task]) -> Result<MetricsSnapshot> {
    let pipeline_name = run
        .name
        .as_deref()
        .ok_or(RunLensError::MissingRunIdentity(run.id))?;

    let task_metrics: Vec<TaskMetric> = tasks.iter().map(build_task_metric).collect();

    let mut counts = TaskCounts {
        total: tasks.len() as u64,
        ..TaskCounts::default()
    };
    let mut errors: IndexMap<String, u64> = IndexMap::new();
    for metric in &task_metrics {
        match metric.status {
            TaskStatus::Success => counts.success += 1,
            TaskStatus::Failure => {
                counts.failure += 1;
                let bucket = format!("{}_failure", metric.attributes.kind);
                *errors.entry(bucket).or_insert(0) += 1;
            }
            TaskStatus::Skipped => counts.skipped += 1,
            TaskStatus::Cancelled => {
                counts.cancelled += 1;
                *errors.entry("cancellation".to_string()).or_insert(0) += 1;
            }
            TaskStatus::InProgress => counts.in_progress += 1,
            TaskStatus::Queued => {}
        }
    }

    let state = if run.started_at.is_none() {
        RunState::Pending
    } else if task_metrics
        .iter()
        .any(|metric| metric.status == TaskStatus::InProgress)
    {
        RunState::Executing
    } else {
        RunState::Finalizing
    };

    let result = if run.is_finished() {
        run.conclusion.as_deref().map(classify_conclusion)
    } else {
        None
    };

    Ok(MetricsSnapshot {
        pipeline: PipelineAttributes {
            name: pipeline_name.to_string(),
            run_id: run.id,
            run_number: run.run_number,
            attempt: run.attempt,
            trigger: run.trigger.clone(),
            ref_name: run.ref_name.clone(),
            head_sha: run.head_sha.clone(),
            url: run.url.clone(),
        },
        worker: tasks
            .iter()
            .find_map(|task| task.worker.as_ref())
            .map(|worker| WorkerAttributes {
                name: worker.name.clone(),
                labels: worker.labels.clone(),
            }),
        state,
        result,
        duration_ms: duration_ms(run.started_at, run.updated_at),
        queue_time_ms: duration_ms(run.created_at, run.started_at),
        task_counts: counts,
        errors,
        tasks: task_metrics,
        collected_at: Utc::now(),
    })
}

fn build_task_metric(task: &Task) -> TaskMetric {
    TaskMetric {
        attributes: TaskAttributes {
            run_id: task.id,
            name: task.name.clone(),
            kind: infer_task_kind(&task.name),
            url: task.url.clone(),
        },
        status: normalize_status(task.conclusion.as_deref(), task.has_started()),
        duration_ms: duration_ms(task.started_at, task.completed_at),
        steps: task.steps.iter().map(build_step_metric).collect(),
    }
}

fn build_step_metric(step: &Step) -> StepMetric {
    StepMetric {
        number: step.number,
        name: step.name.clone(),
        status: normalize_status(step.conclusion.as_deref(), step.has_started()),
        duration_ms: duration_ms(step.started_at, step.completed_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Worker;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn create_run(status: Option<&str>, conclusion: Option<&str>) -> PipelineRun {
        PipelineRun {
            id: 9_001,
            name: Some("ci".to_string()),
            run_number: 42,
            attempt: 1,
            trigger: Some("push".to_string()),
            ref_name: Some("main".to_string()),
            head_sha: Some("deadbeef".to_string()),
            status: status.map(String::from),
            conclusion: conclusion.map(String::from),
            created_at: Some(ts(0)),
            started_at: Some(ts(2)),
            updated_at: Some(ts(12)),
            url: None,
        }
    }

    fn create_task(id: u64, name: &str, conclusion: Option<&str>, started: Option<i64>) -> Task {
        Task {
            id,
            name: name.to_string(),
            status: conclusion.map(|_| "completed".to_string()),
            conclusion: conclusion.map(String::from),
            started_at: started.map(ts),
            completed_at: conclusion.and(started).map(|s| ts(s + 4)),
            worker: None,
            steps: Vec::new(),
            url: None,
        }
    }

    fn create_step(number: u32, name: &str, conclusion: Option<&str>, started: Option<i64>) -> Step {
        Step {
            number,
            name: name.to_string(),
            status: conclusion.map(|_| "completed".to_string()),
            conclusion: conclusion.map(String::from),
            started_at: started.map(ts),
            completed_at: conclusion.and(started).map(|s| ts(s + 1)),
        }
    }

    mod collect_metrics_tests {
        use super::*;

        #[test]
        fn test_successful_run_rollup() {
            // Arrange: finished run, one successful task with two steps.
            let run = create_run(Some("completed"), Some("success"));
            let mut task = create_task(1, "unit-tests", Some("success"), Some(3));
            task.steps = vec![
                create_step(1, "checkout", Some("success"), Some(3)),
                create_step(2, "run tests", Some("success"), Some(5)),
            ];

            // Act
            let snapshot = collect_metrics(&run, &[task]).unwrap();

            // Assert
            assert_eq!(snapshot.task_counts.success, 1);
            assert_eq!(snapshot.task_counts.total, 1);
            assert_eq!(snapshot.result, Some(RunResult::Success));
            assert_eq!(snapshot.duration_ms, Some(10_000));
            assert_eq!(snapshot.queue_time_ms, Some(2_000));
            assert!(snapshot.errors.is_empty());
            assert_eq!(snapshot.tasks[0].steps.len(), 2);
            assert_eq!(snapshot.tasks[0].duration_ms, Some(4_000));
        }

        #[test]
        fn test_executing_run_with_failed_and_running_tasks() {
            let run = create_run(Some("in_progress"), None);
            let failed = create_task(1, "unit-tests", Some("failure"), Some(3));
            let running = create_task(2, "build-artifact", None, Some(4));

            let snapshot = collect_metrics(&run, &[failed, running]).unwrap();

            assert_eq!(snapshot.state, RunState::Executing);
            assert_eq!(snapshot.result, None);
            assert_eq!(snapshot.task_counts.failure, 1);
            assert_eq!(snapshot.task_counts.in_progress, 1);
            assert_eq!(snapshot.errors.get("test_failure"), Some(&1));
        }

        #[test]
        fn test_unrecognized_conclusion_counts_as_failure() {
            let run = create_run(Some("completed"), Some("success"));
            let task = create_task(1, "deploy-gate", Some("action_required"), Some(3));

            let snapshot = collect_metrics(&run, &[task]).unwrap();

            assert_eq!(snapshot.tasks[0].status, TaskStatus::Failure);
            assert_eq!(snapshot.task_counts.failure, 1);
            assert_eq!(snapshot.task_counts.success, 0);
            assert_eq!(snapshot.errors.get("deploy_failure"), Some(&1));
        }

        #[test]
        fn test_unstarted_task_has_unknown_duration_and_counts_as_queued() {
            let run = create_run(Some("in_progress"), None);
            let task = create_task(1, "deploy", None, None);

            let snapshot = collect_metrics(&run, &[task]).unwrap();

            assert_eq!(snapshot.tasks[0].status, TaskStatus::Queued);
            assert_eq!(snapshot.tasks[0].duration_ms, None);
            assert_eq!(snapshot.task_counts.queued(), 1);
        }

        #[test]
        fn test_counters_never_exceed_total() {
            let run = create_run(Some("in_progress"), None);
            let tasks = vec![
                create_task(1, "lint", Some("success"), Some(3)),
                create_task(2, "unit-tests", Some("failure"), Some(3)),
                create_task(3, "e2e-tests", Some("cancelled"), Some(3)),
                create_task(4, "docs", Some("skipped"), None),
                create_task(5, "build", None, Some(4)),
                create_task(6, "deploy", None, None),
            ];

            let snapshot = collect_metrics(&run, &tasks).unwrap();

            let counts = snapshot.task_counts;
            let accounted =
                counts.success + counts.failure + counts.skipped + counts.cancelled + counts.in_progress;
            assert!(accounted <= counts.total);
            assert_eq!(counts.queued(), 1);
        }

        #[test]
        fn test_error_buckets_are_frequencies_not_lists() {
            let run = create_run(Some("completed"), Some("failure"));
            let tasks = vec![
                create_task(1, "lint-style", Some("failure"), Some(3)),
                create_task(2, "lint-docs", Some("failure"), Some(3)),
                create_task(3, "deploy-a", Some("cancelled"), Some(3)),
                create_task(4, "deploy-b", Some("cancelled"), Some(3)),
            ];

            let snapshot = collect_metrics(&run, &tasks).unwrap();

            assert_eq!(snapshot.errors.len(), 2);
            assert_eq!(snapshot.errors.get("lint_failure"), Some(&2));
            assert_eq!(snapshot.errors.get("cancellation"), Some(&2));
        }

        #[test]
        fn test_pending_before_the_run_starts() {
            let mut run = create_run(Some("queued"), None);
            run.started_at = None;

            let snapshot = collect_metrics(&run, &[]).unwrap();

            assert_eq!(snapshot.state, RunState::Pending);
            assert_eq!(snapshot.duration_ms, None);
        }

        #[test]
        fn test_finalizing_once_no_task_runs() {
            let run = create_run(Some("in_progress"), None);
            let tasks = vec![
                create_task(1, "build", Some("success"), Some(3)),
                create_task(2, "tests", Some("failure"), Some(3)),
            ];

            let snapshot = collect_metrics(&run, &tasks).unwrap();

            assert_eq!(snapshot.state, RunState::Finalizing);
        }

        #[test]
        fn test_result_never_guessed_while_running() {
            let run = create_run(Some("in_progress"), None);
            let tasks = vec![create_task(1, "build", Some("success"), Some(3))];

            let snapshot = collect_metrics(&run, &tasks).unwrap();

            assert_eq!(snapshot.result, None);
        }

        #[test]
        fn test_result_taxonomy_on_finished_runs() {
            let timed_out = create_run(Some("completed"), Some("timed_out"));
            let snapshot = collect_metrics(&timed_out, &[]).unwrap();
            assert_eq!(snapshot.result, Some(RunResult::Timeout));

            let weird = create_run(Some("completed"), Some("mystery_state"));
            let snapshot = collect_metrics(&weird, &[]).unwrap();
            assert_eq!(snapshot.result, Some(RunResult::Error));
        }

        #[test]
        fn test_missing_pipeline_name_is_fatal() {
            let mut run = create_run(Some("completed"), Some("success"));
            run.name = None;

            let err = collect_metrics(&run, &[]).unwrap_err();
            assert!(matches!(err, RunLensError::MissingRunIdentity(9_001)));
        }

        #[test]
        fn test_worker_comes_from_first_task_that_reports_one() {
            let run = create_run(Some("in_progress"), None);
            let bare = create_task(1, "build", None, Some(3));
            let mut scheduled = create_task(2, "tests", None, Some(4));
            scheduled.worker = Some(Worker {
                name: "runner-7".to_string(),
                labels: vec!["ubuntu-latest".to_string(), "x64".to_string()],
            });

            let snapshot = collect_metrics(&run, &[bare, scheduled]).unwrap();

            let worker = snapshot.worker.expect("worker attributes");
            assert_eq!(worker.name, "runner-7");
            assert_eq!(worker.labels.len(), 2);
        }

        #[test]
        fn test_no_worker_info_omits_the_block() {
            let run = create_run(Some("in_progress"), None);
            let snapshot = collect_metrics(&run, &[create_task(1, "build", None, Some(3))]).unwrap();
            assert!(snapshot.worker.is_none());

            let json = serde_json::to_value(&snapshot).unwrap();
            assert!(json.get("worker").is_none());
        }

        #[test]
        fn test_missing_creation_time_degrades_queue_time() {
            let mut run = create_run(Some("completed"), Some("success"));
            run.created_at = None;

            let snapshot = collect_metrics(&run, &[]).unwrap();

            assert_eq!(snapshot.queue_time_ms, None);
            assert_eq!(snapshot.duration_ms, Some(10_000));
        }

        #[test]
        fn test_recollection_matches_except_timestamp() {
            let run = create_run(Some("completed"), Some("success"));
            let tasks = vec![
                create_task(1, "lint", Some("success"), Some(3)),
                create_task(2, "tests", Some("failure"), Some(3)),
            ];

            let first = collect_metrics(&run, &tasks).unwrap();
            let second = collect_metrics(&run, &tasks).unwrap();

            assert_eq!(first.pipeline, second.pipeline);
            assert_eq!(first.state, second.state);
            assert_eq!(first.result, second.result);
            assert_eq!(first.task_counts, second.task_counts);
            assert_eq!(first.errors, second.errors);
            assert_eq!(first.tasks, second.tasks);
        }

        #[test]
        fn test_step_metrics_keep_provider_order() {
            let run = create_run(Some("completed"), Some("success"));
            let mut task = create_task(1, "tests", Some("success"), Some(3));
            task.steps = vec![
                create_step(1, "checkout", Some("success"), Some(3)),
                create_step(2, "build", Some("success"), Some(4)),
                create_step(3, "upload", None, None),
            ];

            let snapshot = collect_metrics(&run, &[task]).unwrap();

            let steps = &snapshot.tasks[0].steps;
            let numbers: Vec<u32> = steps.iter().map(|s| s.number).collect();
            assert_eq!(numbers, vec![1, 2, 3]);
            assert_eq!(steps[2].status, TaskStatus::Queued);
            assert_eq!(steps[2].duration_ms, None);
        }

        #[test]
        fn test_snapshot_serializes_semantic_convention_names() {
            let run = create_run(Some("completed"), Some("success"));
            let task = create_task(1, "unit-tests", Some("success"), Some(3));

            let snapshot = collect_metrics(&run, &[task]).unwrap();
            let json = serde_json::to_value(&snapshot).unwrap();

            assert_eq!(json["pipeline"]["cicd.pipeline.name"], "ci");
            assert_eq!(json["pipeline"]["cicd.pipeline.run.id"], 9_001);
            assert_eq!(json["state"], "finalizing");
            assert_eq!(json["result"], "success");
            assert_eq!(
                json["tasks"][0]["attributes"]["cicd.pipeline.task.name"],
                "unit-tests"
            );
            assert_eq!(
                json["tasks"][0]["attributes"]["cicd.pipeline.task.type"],
                "test"
            );
        }
    }
}
