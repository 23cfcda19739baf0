use crate::telemetry::duration::format_duration;
use crate::telemetry::{MetricsSnapshot, RunResult, RunState, TaskStatus};

/// Generate a Markdown summary of one collected run.
///
/// Suited for job summaries and PR comments; every value renders as plain
/// GitHub-flavored Markdown with no terminal styling.
#[must_use]
pub fn render_markdown_summary(snapshot: &MetricsSnapshot) -> String {
    let mut md = String::new();

    let pipeline = &snapshot.pipeline;
    md.push_str(&format!(
        "## {} {} run #{}\n\n",
        run_emoji(snapshot),
        pipeline.name,
        pipeline.run_number
    ));

    // Overview table
    md.push_str("| | |\n");
    md.push_str("|---|---|\n");
    let run_label = match &pipeline.url {
        Some(url) => format!("[{}]({url}) (attempt {})", pipeline.run_id, pipeline.attempt),
        None => format!("{} (attempt {})", pipeline.run_id, pipeline.attempt),
    };
    md.push_str(&format!("| **Run** | {run_label} |\n"));
    md.push_str(&format!("| **State** | {} |\n", snapshot.state));
    if let Some(result) = snapshot.result {
        md.push_str(&format!("| **Result** | {result} |\n"));
    }
    if let Some(trigger) = &pipeline.trigger {
        md.push_str(&format!("| **Trigger** | {trigger} |\n"));
    }
    if let Some(ref_name) = &pipeline.ref_name {
        md.push_str(&format!("| **Branch** | `{ref_name}` |\n"));
    }
    if let Some(sha) = &pipeline.head_sha {
        md.push_str(&format!(
            "| **Commit** | `{}` |\n",
            &sha[..8.min(sha.len())]
        ));
    }
    md.push_str(&format!(
        "| **Duration** | {} |\n",
        format_duration(snapshot.duration_ms)
    ));
    md.push_str(&format!(
        "| **Queued** | {} |\n",
        format_duration(snapshot.queue_time_ms)
    ));
    if let Some(worker) = &snapshot.worker {
        md.push_str(&format!("| **Worker** | `{}` |\n", worker.name));
    }
    md.push('\n');

    // Tasks table (if any)
    if !snapshot.tasks.is_empty() {
        md.push_str("### Tasks\n\n");
        md.push_str("| Task | Type | Status | Duration | Steps |\n");
        md.push_str("|------|------|--------|----------|-------|\n");

        for task in &snapshot.tasks {
            md.push_str(&format!(
                "| {} `{}` | {} | {} | {} | {} |\n",
                task_emoji(task.status),
                task.attributes.name,
                task.attributes.kind,
                task.status,
                format_duration(task.duration_ms),
                task.steps.len()
            ));
        }
        md.push('\n');
    }

    // Error classifications (if any)
    if !snapshot.errors.is_empty() {
        md.push_str("### Errors\n\n");
        md.push_str("| Classification | Count |\n");
        md.push_str("|----------------|-------|\n");
        for (bucket, count) in &snapshot.errors {
            md.push_str(&format!("| `{bucket}` | {count} |\n"));
        }
        md.push('\n');
    }

    // Footer
    md.push_str(&format!(
        "---\n*runlens v{} at {}*\n",
        env!("CARGO_PKG_VERSION"),
        snapshot.collected_at.format("%Y-%m-%d %H:%M UTC")
    ));

    md
}

fn run_emoji(snapshot: &MetricsSnapshot) -> &'static str {
    match snapshot.result {
        Some(RunResult::Success) => "✅",
        Some(RunResult::Failure | RunResult::Error) => "❌",
        Some(RunResult::Timeout) => "⏰",
        Some(RunResult::Cancellation) => "🚫",
        Some(RunResult::Skip) => "⏭️",
        None => match snapshot.state {
            RunState::Pending => "⏳",
            RunState::Executing | RunState::Finalizing => "🔄",
        },
    }
}

fn task_emoji(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Success => "✅",
        TaskStatus::Failure => "❌",
        TaskStatus::Cancelled => "🚫",
        TaskStatus::Skipped => "⏭️",
        TaskStatus::InProgress => "🔄",
        TaskStatus::Queued => "⏳",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::classify::TaskKind;
    use crate::telemetry::metrics::{PipelineAttributes, TaskAttributes, TaskCounts, TaskMetric};
    use chrono::{TimeZone, Utc};
    use indexmap::IndexMap;

    fn create_test_snapshot() -> MetricsSnapshot {
        MetricsSnapshot {
            pipeline: PipelineAttributes {
                name: "ci".to_string(),
                run_id: 9_001,
                run_number: 42,
                attempt: 1,
                trigger: Some("push".to_string()),
                ref_name: Some("main".to_string()),
                head_sha: Some("abc123def456".to_string()),
                url: Some("https://github.com/acme/widgets/actions/runs/9001".to_string()),
            },
            worker: None,
            state: RunState::Finalizing,
            result: Some(RunResult::Success),
            duration_ms: Some(65_000),
            queue_time_ms: Some(2_000),
            task_counts: TaskCounts {
                total: 1,
                success: 1,
                ..TaskCounts::default()
            },
            errors: IndexMap::new(),
            tasks: vec![TaskMetric {
                attributes: TaskAttributes {
                    run_id: 1,
                    name: "unit-tests".to_string(),
                    kind: TaskKind::Test,
                    url: None,
                },
                status: crate::telemetry::TaskStatus::Success,
                duration_ms: Some(60_000),
                steps: Vec::new(),
            }],
            collected_at: Utc.timestamp_opt(1_700_000_100, 0).unwrap(),
        }
    }

    #[test]
    fn test_markdown_summary_success() {
        let md = render_markdown_summary(&create_test_snapshot());

        assert!(md.contains("## ✅ ci run #42"));
        assert!(md.contains("[9001](https://github.com/acme/widgets/actions/runs/9001)"));
        assert!(md.contains("| **Result** | success |"));
        assert!(md.contains("`abc123de`"));
        assert!(md.contains("✅ `unit-tests` | test | success | 1m | 0 |"));
        assert!(md.contains("runlens v"));
    }

    #[test]
    fn test_markdown_summary_in_flight_run_has_no_result_row() {
        let mut snapshot = create_test_snapshot();
        snapshot.result = None;
        snapshot.state = RunState::Executing;

        let md = render_markdown_summary(&snapshot);

        assert!(md.starts_with("## 🔄"));
        assert!(!md.contains("**Result**"));
    }

    #[test]
    fn test_markdown_summary_lists_error_buckets() {
        let mut snapshot = create_test_snapshot();
        snapshot.errors.insert("test_failure".to_string(), 2);
        snapshot.errors.insert("cancellation".to_string(), 1);

        let md = render_markdown_summary(&snapshot);

        assert!(md.contains("### Errors"));
        assert!(md.contains("| `test_failure` | 2 |"));
        assert!(md.contains("| `cancellation` | 1 |"));
    }

    #[test]
    fn test_markdown_summary_unknown_duration_renders_a_dash() {
        let mut snapshot = create_test_snapshot();
        snapshot.duration_ms = None;

        let md = render_markdown_summary(&snapshot);

        assert!(md.contains("| **Duration** | — |"));
    }
}
