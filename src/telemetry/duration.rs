use chrono::{DateTime, Utc};

/// Millisecond delta between two optional timestamps.
///
/// Returns `None` when either timestamp is absent. A negative delta means
/// the provider's clocks disagree about the ordering of events; that is a
/// data defect, not a duration, so it also comes back as `None`.
pub fn duration_ms(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Option<u64> {
    let (start, end) = (start?, end?);
    u64::try_from((end - start).num_milliseconds()).ok()
}

/// Formats an optional millisecond duration for humans.
///
/// Unknown durations render as a dash, never as zero.
pub fn format_duration(duration_ms: Option<u64>) -> String {
    let Some(ms) = duration_ms else {
        return "—".to_string();
    };
    if ms < 1_000 {
        return format!("{ms}ms");
    }
    let secs = ms / 1_000;
    if secs < 60 {
        let tenths = (ms % 1_000) / 100;
        if tenths == 0 {
            return format!("{secs}s");
        }
        return format!("{secs}.{tenths}s");
    }
    let mins = secs / 60;
    let rem = secs % 60;
    if mins < 60 {
        if rem == 0 {
            return format!("{mins}m");
        }
        return format!("{mins}m {rem}s");
    }
    format!("{}h {}m", mins / 60, mins % 60)
}
