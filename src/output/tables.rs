use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::telemetry::duration::format_duration;
use crate::telemetry::{SpanStatus, TaskStatus};

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn task_status_cell(status: TaskStatus) -> Cell {
    let cell = Cell::new(status.as_str());
    match status {
        TaskStatus::Success => cell.fg(TableColor::Green),
        TaskStatus::Failure => cell.fg(TableColor::Red),
        TaskStatus::Cancelled => cell.fg(TableColor::Yellow),
        TaskStatus::InProgress => cell.fg(TableColor::Cyan),
        TaskStatus::Queued | TaskStatus::Skipped => cell.fg(TableColor::DarkGrey),
    }
}

pub fn span_status_cell(status: &SpanStatus) -> Cell {
    match status {
        SpanStatus::Ok => Cell::new("ok").fg(TableColor::Green),
        SpanStatus::Error { .. } => Cell::new("error").fg(TableColor::Red),
        SpanStatus::Unset => Cell::new("unset").fg(TableColor::DarkGrey),
    }
}

pub fn duration_cell(duration_ms: Option<u64>) -> Cell {
    let text = format_duration(duration_ms);
    match duration_ms {
        None => Cell::new(text).fg(TableColor::DarkGrey),
        Some(ms) if ms <= 10 * 60 * 1000 => Cell::new(text).fg(TableColor::Green),
        Some(ms) if ms <= 15 * 60 * 1000 => Cell::new(text).fg(TableColor::Yellow),
        Some(_) => Cell::new(text).fg(TableColor::Red),
    }
}

pub fn error_count_cell(count: u64) -> Cell {
    if count > 0 {
        Cell::new(count.to_string()).fg(TableColor::Red)
    } else {
        Cell::new(count.to_string())
    }
}
