use std::fmt;

use serde::{Deserialize, Serialize};

use super::span::SpanStatus;

/// Final result of a finished unit of work.
///
/// Mirrors the `cicd.pipeline.result` vocabulary; every provider conclusion
/// collapses into one of these six values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunResult {
    Success,
    Failure,
    Cancellation,
    Error,
    Skip,
    Timeout,
}

impl RunResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancellation => "cancellation",
            Self::Error => "error",
            Self::Skip => "skip",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized status of a task, independent of provider vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Queued,
    InProgress,
    Success,
    Failure,
    Cancelled,
    Skipped,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancelled => "cancelled",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RunResult> for TaskStatus {
    fn from(result: RunResult) -> Self {
        match result {
            RunResult::Success => Self::Success,
            RunResult::Failure | RunResult::Error | RunResult::Timeout => Self::Failure,
            RunResult::Cancellation => Self::Cancelled,
            RunResult::Skip => Self::Skipped,
        }
    }
}

/// Coarse task category inferred from the display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Lint,
    Test,
    Build,
    Deploy,
    Notify,
    Other,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lint => "lint",
            Self::Test => "test",
            Self::Build => "build",
            Self::Deploy => "deploy",
            Self::Notify => "notify",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword sets per category, checked in priority order so a name matching
/// several categories resolves deterministically to the earliest one.
const KIND_KEYWORDS: &[(TaskKind, &[&str])] = &[
    (TaskKind::Lint, &["lint", "clippy", "fmt", "format", "style"]),
    (
        TaskKind::Test,
        &["test", "spec", "unit", "e2e", "integration", "coverage"],
    ),
    (
        TaskKind::Build,
        &["build", "compile", "package", "bundle", "docker", "image"],
    ),
    (
        TaskKind::Deploy,
        &["deploy", "release", "publish", "rollout", "promote"],
    ),
    (TaskKind::Notify, &["notify", "slack", "alert", "email"]),
];

/// Infers the coarse category of a task from its display name.
pub fn infer_task_kind(name: &str) -> TaskKind {
    let name = name.to_lowercase();
    for (kind, keywords) in KIND_KEYWORDS {
        if keywords.iter().any(|keyword| name.contains(keyword)) {
            return *kind;
        }
    }
    TaskKind::Other
}

/// Maps a raw provider conclusion onto the fixed result taxonomy.
///
/// Any conclusion this table does not know about classifies as `Error`: a
/// finished unit with an unrecognized conclusion is itself informative and
/// must never pass as success.
pub fn classify_conclusion(conclusion: &str) -> RunResult {
    match conclusion.to_ascii_lowercase().as_str() {
        "success" | "neutral" => RunResult::Success,
        "failure" | "startup_failure" => RunResult::Failure,
        "cancelled" | "canceled" | "stale" => RunResult::Cancellation,
        "skipped" => RunResult::Skip,
        "timed_out" => RunResult::Timeout,
        _ => RunResult::Error,
    }
}

/// Normalizes a raw `(conclusion, started)` pair into a task status.
///
/// A unit without a conclusion is still queued or running; which of the two
/// is decided by the presence of a start timestamp, not by the raw status
/// word.
pub fn normalize_status(conclusion: Option<&str>, has_started: bool) -> TaskStatus {
    match conclusion {
        Some(conclusion) => classify_conclusion(conclusion).into(),
        None if has_started => TaskStatus::InProgress,
        None => TaskStatus::Queued,
    }
}

/// Span status for a unit given its raw conclusion.
///
/// In-flight units stay `Unset`. Only conclusions that collapse to success
/// or skip produce `Ok`; everything else carries a message naming the raw
/// conclusion so trace viewers see what the provider actually reported.
pub fn span_status(conclusion: Option<&str>) -> SpanStatus {
    let Some(conclusion) = conclusion else {
        return SpanStatus::Unset;
    };
    match classify_conclusion(conclusion) {
        RunResult::Success | RunResult::Skip => SpanStatus::Ok,
        RunResult::Error => SpanStatus::Error {
            message: format!("unrecognized conclusion `{conclusion}`"),
        },
        _ => SpanStatus::Error {
            message: format!("concluded with `{conclusion}`"),
        },
    }
}
