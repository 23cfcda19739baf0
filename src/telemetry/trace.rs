use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::json;

use crate::error::{Result, RunLensError};
use crate::model::{PipelineRun, Step, Task};

use super::classify::{infer_task_kind, span_status};
use super::ids;
use super::semconv;
use super::span::{Span, Trace};

/// Builds the span tree for one pipeline run.
///
/// One trace id covers every span. The root span represents the run itself;
/// each started task contributes a job span under the root, and each started
/// step a span under its task. Units that never started contribute nothing,
/// since they have no timing to report. The final list is sorted by start
/// time (stable, so ties keep discovery order: a job ahead of its own steps,
/// tasks in input order); parent links stay resolvable by id regardless.
///
/// # Errors
///
/// Fails when the run carries no pipeline name (`MissingRunIdentity`) or
/// neither a start nor a creation timestamp (`MissingRunStart`); either gap
/// leaves nothing to anchor a trace on.
pub fn build_trace(run: &PipelineRun, tasks: &[Task]) -> Result<Trace> {
    let pipeline_name = run
        .name
        .as_deref()
        .ok_or(RunLensError::MissingRunIdentity(run.id))?;

    let trace_id = ids::trace_id();
    let root = build_root_span(&trace_id, pipeline_name, run)?;
    let root_span_id = root.span_id.clone();

    let mut spans = vec![root];
    for task in tasks {
        let Some(task_started) = task.started_at else {
            continue;
        };
        let job_span = build_job_span(&trace_id, &root_span_id, task, task_started);
        let job_span_id = job_span.span_id.clone();
        spans.push(job_span);

        for step in &task.steps {
            let Some(step_started) = step.started_at else {
                continue;
            };
            spans.push(build_step_span(
                &trace_id,
                &job_span_id,
                task,
                step,
                step_started,
            ));
        }
    }

    spans.sort_by_key(|span| span.start_time);

    Ok(Trace {
        trace_id,
        root_span_id,
        spans,
    })
}

fn build_root_span(trace_id: &str, pipeline_name: &str, run: &PipelineRun) -> Result<Span> {
    // The actual start anchors the root; a run that only exists as a record
    // falls back to its creation time.
    let start_time = run
        .started_at
        .or(run.created_at)
        .ok_or(RunLensError::MissingRunStart(run.id))?;
    let end_time = if run.is_finished() {
        run.updated_at
    } else {
        None
    };

    let mut attributes = IndexMap::new();
    attributes.insert(semconv::PIPELINE_NAME.to_string(), json!(pipeline_name));
    attributes.insert(semconv::PIPELINE_RUN_ID.to_string(), json!(run.id));
    attributes.insert(
        semconv::PIPELINE_RUN_NUMBER.to_string(),
        json!(run.run_number),
    );
    attributes.insert(
        semconv::PIPELINE_RUN_ATTEMPT.to_string(),
        json!(run.attempt),
    );
    if let Some(trigger) = &run.trigger {
        attributes.insert(semconv::PIPELINE_RUN_TRIGGER.to_string(), json!(trigger));
    }
    if let Some(ref_name) = &run.ref_name {
        attributes.insert(semconv::VCS_REF_HEAD_NAME.to_string(), json!(ref_name));
    }
    if let Some(head_sha) = &run.head_sha {
        attributes.insert(semconv::VCS_REF_HEAD_REVISION.to_string(), json!(head_sha));
    }
    if let Some(url) = &run.url {
        attributes.insert(semconv::PIPELINE_RUN_URL_FULL.to_string(), json!(url));
    }

    Ok(Span {
        trace_id: trace_id.to_string(),
        span_id: ids::span_id(),
        parent_span_id: None,
        name: pipeline_name.to_string(),
        start_time,
        end_time,
        status: span_status(run.conclusion.as_deref()),
        attributes,
    })
}

fn build_job_span(
    trace_id: &str,
    root_span_id: &str,
    task: &Task,
    start_time: DateTime<Utc>,
) -> Span {
    let end_time = if task.is_finished() {
        task.completed_at
    } else {
        None
    };

    let mut attributes = IndexMap::new();
    attributes.insert(semconv::TASK_RUN_ID.to_string(), json!(task.id));
    attributes.insert(semconv::TASK_NAME.to_string(), json!(task.name));
    attributes.insert(
        semconv::TASK_TYPE.to_string(),
        json!(infer_task_kind(&task.name).as_str()),
    );
    if let Some(worker) = &task.worker {
        attributes.insert(semconv::WORKER_NAME.to_string(), json!(worker.name));
        if !worker.labels.is_empty() {
            attributes.insert(semconv::WORKER_LABELS.to_string(), json!(worker.labels));
        }
    }
    if let Some(url) = &task.url {
        attributes.insert(semconv::TASK_RUN_URL_FULL.to_string(), json!(url));
    }

    Span {
        trace_id: trace_id.to_string(),
        span_id: ids::span_id(),
        parent_span_id: Some(root_span_id.to_string()),
        name: task.name.clone(),
        start_time,
        end_time,
        status: span_status(task.conclusion.as_deref()),
        attributes,
    }
}

fn build_step_span(
    trace_id: &str,
    job_span_id: &str,
    task: &Task,
    step: &Step,
    start_time: DateTime<Utc>,
) -> Span {
    let end_time = if step.is_finished() {
        step.completed_at
    } else {
        None
    };

    let mut attributes = IndexMap::new();
    attributes.insert(semconv::TASK_STEP_NUMBER.to_string(), json!(step.number));
    attributes.insert(semconv::TASK_STEP_NAME.to_string(), json!(step.name));
    attributes.insert(semconv::TASK_NAME.to_string(), json!(task.name));

    Span {
        trace_id: trace_id.to_string(),
        span_id: ids::span_id(),
        parent_span_id: Some(job_span_id.to_string()),
        name: step.name.clone(),
        start_time,
        end_time,
        status: span_status(step.conclusion.as_deref()),
        attributes,
    }
}
