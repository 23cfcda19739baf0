use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::telemetry::{MetricsSnapshot, Trace};

/// Writes the combined export document to `output`.
///
/// The document carries both halves of a collection under stable top-level
/// keys, so a single invocation can be piped straight into another tool:
///
/// ```json
/// {"trace": {...}, "metrics": {...}}
/// ```
pub fn export_json(
    trace: &Trace,
    snapshot: &MetricsSnapshot,
    pretty: bool,
    output: &mut dyn Write,
) -> Result<()> {
    let document = serde_json::json!({
        "trace": trace,
        "metrics": snapshot,
    });
    let json = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    writeln!(output, "{json}")?;
    Ok(())
}

/// Writes `trace.json` and `metrics.json` into `dir`, creating it if needed.
///
/// Split files suit collectors that ingest traces and metrics through
/// separate endpoints.
pub fn write_export_files(
    dir: &Path,
    trace: &Trace,
    snapshot: &MetricsSnapshot,
    pretty: bool,
) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;
    write_json_file(&dir.join("trace.json"), trace, pretty)?;
    write_json_file(&dir.join("metrics.json"), snapshot, pretty)?;
    Ok(())
}

fn write_json_file<T: serde::Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create export file {}", path.display()))?;
    writeln!(file, "{json}")?;
    Ok(())
}
