mod exports;
mod markdown;
mod progress;
mod styling;
mod summary;
mod tables;

pub use exports::{export_json, write_export_files};
pub use markdown::render_markdown_summary;
pub use progress::PhaseProgress;
pub use styling::{dim, magenta_bold};
pub use summary::print_summary;

/// Prints the `runlens` banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🔭 runlens"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("CI/CD Run Trace & Metrics Exporter")
    );
}
