use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::duration::duration_ms;

/// Outcome of a single span.
///
/// `error` always carries a human-readable message; `unset` marks a unit the
/// provider has not concluded yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "lowercase")]
pub enum SpanStatus {
    Unset,
    Ok,
    Error { message: String },
}

impl SpanStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// A single timed unit of work within a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub trace_id: String,
    pub span_id: String,
    /// Absent exactly once per trace, on the root span
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,
    pub name: String,
    pub start_time: DateTime<Utc>,
    /// Absent while the unit is still in progress
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub status: SpanStatus,
    /// Attribute names follow [`super::semconv`]
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Value>,
}

impl Span {
    /// Wall-clock duration; `None` while the unit is in progress.
    pub fn duration_ms(&self) -> Option<u64> {
        duration_ms(Some(self.start_time), self.end_time)
    }

    pub fn is_root(&self) -> bool {
        self.parent_span_id.is_none()
    }
}

/// All spans sharing one trace identifier, forming one tree.
///
/// The span list is sorted by start time for presentation; parent/child
/// linkage is carried by IDs and survives any reordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub trace_id: String,
    pub root_span_id: String,
    pub spans: Vec<Span>,
}

impl Trace {
    pub fn root(&self) -> Option<&Span> {
        self.find(&self.root_span_id)
    }

    pub fn find(&self, span_id: &str) -> Option<&Span> {
        self.spans.iter().find(|s| s.span_id == span_id)
    }

    /// Direct children of `span_id`, in list order.
    pub fn children_of(&self, span_id: &str) -> Vec<&Span> {
        self.spans
            .iter()
            .filter(|s| s.parent_span_id.as_deref() == Some(span_id))
            .collect()
    }
}
