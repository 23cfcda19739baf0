use std::fmt::Write;

use comfy_table::{Cell, Color as TableColor};

use crate::telemetry::duration::format_duration;
use crate::telemetry::{MetricsSnapshot, RunResult, RunState, Span, Trace};

use super::styling::{bright, bright_green, bright_red, bright_yellow, cyan, dim};
use super::tables::{
    create_table, duration_cell, error_count_cell, span_status_cell, task_status_cell,
};

/// Prints a human-readable summary of one collected run to stdout.
///
/// Displays color-coded sections showing:
/// - Overview: Pipeline identity, run state, result, durations
/// - Tasks: Per-task status, duration, and step count
/// - Error Classifications: Failure frequency by task kind
/// - Trace: The span tree with per-span timing and status
pub fn print_summary(snapshot: &MetricsSnapshot, trace: &Trace) {
    println!("{}", render_summary(snapshot, trace));
}

// Helper functions

fn create_cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", bright(emoji), bright(title).underlined());
}

fn state_display(state: RunState) -> console::StyledObject<String> {
    match state {
        RunState::Pending => bright_yellow(state),
        RunState::Executing => cyan(state),
        RunState::Finalizing => bright(state.to_string()),
    }
}

fn result_display(result: Option<RunResult>) -> console::StyledObject<String> {
    match result {
        None => dim("—"),
        Some(RunResult::Success) => bright_green(RunResult::Success),
        Some(RunResult::Skip) => dim(RunResult::Skip),
        Some(RunResult::Cancellation) => bright_yellow(RunResult::Cancellation),
        Some(result) => bright_red(result),
    }
}

/// Parent-chain length; the root sits at depth 0.
fn span_depth(trace: &Trace, span: &Span) -> usize {
    let mut depth = 0;
    let mut current = span.parent_span_id.as_deref();
    while let Some(parent_id) = current {
        depth += 1;
        current = trace
            .find(parent_id)
            .and_then(|parent| parent.parent_span_id.as_deref());
    }
    depth
}

fn format_task_counts(snapshot: &MetricsSnapshot) -> String {
    let counts = snapshot.task_counts;
    let mut parts = vec![format!("{} total", counts.total)];
    if counts.success > 0 {
        parts.push(format!("{}", bright_green(format!("{} succeeded", counts.success))));
    }
    if counts.failure > 0 {
        parts.push(format!("{}", bright_red(format!("{} failed", counts.failure))));
    }
    if counts.cancelled > 0 {
        parts.push(format!("{}", bright_yellow(format!("{} cancelled", counts.cancelled))));
    }
    if counts.skipped > 0 {
        parts.push(format!("{}", dim(format!("{} skipped", counts.skipped))));
    }
    if counts.in_progress > 0 {
        parts.push(format!("{}", cyan(format!("{} running", counts.in_progress))));
    }
    if counts.queued() > 0 {
        parts.push(format!("{}", dim(format!("{} queued", counts.queued()))));
    }
    parts.join(", ")
}

#[allow(clippy::format_push_string)]
fn render_summary(snapshot: &MetricsSnapshot, trace: &Trace) -> String {
    let mut output = String::new();

    // Overview section
    add_section_header(&mut output, "📊", "Overview");

    let pipeline = &snapshot.pipeline;
    let _ = writeln!(output, "  {} {}", dim("Pipeline:"), cyan(&pipeline.name));
    let _ = writeln!(
        output,
        "  {} {}",
        dim("Run:"),
        bright_yellow(format!(
            "#{} (id {}, attempt {})",
            pipeline.run_number, pipeline.run_id, pipeline.attempt
        ))
    );
    if let Some(trigger) = &pipeline.trigger {
        let branch = pipeline.ref_name.as_deref().unwrap_or("?");
        let _ = writeln!(
            output,
            "  {} {}",
            dim("Trigger:"),
            bright(format!("{trigger} on {branch}"))
        );
    }
    let _ = writeln!(output, "  {} {}", dim("State:"), state_display(snapshot.state));
    let _ = writeln!(
        output,
        "  {} {}",
        dim("Result:"),
        result_display(snapshot.result)
    );
    let _ = writeln!(
        output,
        "  {} {}",
        dim("Duration:"),
        bright_yellow(format_duration(snapshot.duration_ms))
    );
    let _ = writeln!(
        output,
        "  {} {}",
        dim("Queued for:"),
        bright_yellow(format_duration(snapshot.queue_time_ms))
    );
    if let Some(worker) = &snapshot.worker {
        let _ = writeln!(output, "  {} {}", dim("Worker:"), bright(&worker.name));
    }
    let _ = writeln!(output, "  {} {}", dim("Tasks:"), format_task_counts(snapshot));
    let _ = writeln!(
        output,
        "  {} {}\n",
        dim("Collected:"),
        dim(snapshot.collected_at.format("%Y-%m-%d %H:%M UTC"))
    );

    // Tasks section
    add_section_header(&mut output, "📋", "Tasks");

    if snapshot.tasks.is_empty() {
        output.push_str(&format!("{}\n\n", bright_yellow("  No tasks reported yet.")));
    } else {
        let mut tasks_table = create_table();
        tasks_table.set_header(create_cyan_header(&[
            "Task", "Type", "Status", "Duration", "Steps",
        ]));

        for task in &snapshot.tasks {
            tasks_table.add_row(vec![
                Cell::new(&task.attributes.name),
                Cell::new(task.attributes.kind.to_string()),
                task_status_cell(task.status),
                duration_cell(task.duration_ms),
                Cell::new(task.steps.len()),
            ]);
        }

        output.push_str(&format!("{tasks_table}\n\n"));
    }

    // Error classifications
    if !snapshot.errors.is_empty() {
        add_section_header(&mut output, "❌", "Error Classifications");

        let mut errors_table = create_table();
        errors_table.set_header(create_cyan_header(&["Classification", "Count"]));
        for (bucket, count) in &snapshot.errors {
            errors_table.add_row(vec![Cell::new(bucket), error_count_cell(*count)]);
        }

        output.push_str(&format!("{errors_table}\n\n"));
    }

    // Trace section
    add_section_header(&mut output, "🧭", "Trace");
    let _ = writeln!(output, "  {} {}", dim("Trace ID:"), dim(&trace.trace_id));

    let mut trace_table = create_table();
    trace_table.set_header(create_cyan_header(&["Span", "Start", "Duration", "Status"]));

    for span in &trace.spans {
        let indent = "  ".repeat(span_depth(trace, span));
        trace_table.add_row(vec![
            Cell::new(format!("{indent}{}", span.name)),
            Cell::new(span.start_time.format("%H:%M:%S")),
            duration_cell(span.duration_ms()),
            span_status_cell(&span.status),
        ]);
    }

    output.push_str(&format!("{trace_table}\n"));

    output
}
