//! The pure transformation core: one pipeline run in, a span trace and a
//! metrics snapshot out.
//!
//! Everything in this tree is a synchronous function over in-memory records.
//! Fetching lives in `providers`, rendering in `output`; neither reaches in
//! here with I/O.

pub mod classify;
pub mod duration;
pub mod ids;
pub mod metrics;
pub mod semconv;
pub mod span;
pub mod trace;

pub use classify::{RunResult, TaskKind, TaskStatus};
pub use metrics::{collect_metrics, MetricsSnapshot, RunState};
pub use span::{Span, SpanStatus, Trace};
pub use trace::build_trace;
