//! OpenTelemetry CI/CD semantic-convention attribute names.
//!
//! Using the registry names verbatim lets any OTel-aware dashboard or trace
//! backend interpret exported documents without a bespoke adapter. Constants
//! marked (extension) follow the registry's naming scheme for fields it does
//! not define yet.

pub const PIPELINE_NAME: &str = "cicd.pipeline.name";
pub const PIPELINE_RUN_ID: &str = "cicd.pipeline.run.id";
pub const PIPELINE_RUN_URL_FULL: &str = "cicd.pipeline.run.url.full";

/// (extension)
pub const PIPELINE_RUN_NUMBER: &str = "cicd.pipeline.run.number";
/// (extension)
pub const PIPELINE_RUN_ATTEMPT: &str = "cicd.pipeline.run.attempt";
/// (extension)
pub const PIPELINE_RUN_TRIGGER: &str = "cicd.pipeline.run.trigger";

pub const TASK_NAME: &str = "cicd.pipeline.task.name";
pub const TASK_RUN_ID: &str = "cicd.pipeline.task.run.id";
pub const TASK_TYPE: &str = "cicd.pipeline.task.type";
pub const TASK_RUN_URL_FULL: &str = "cicd.pipeline.task.run.url.full";

/// (extension)
pub const TASK_STEP_NAME: &str = "cicd.pipeline.task.step.name";
/// (extension)
pub const TASK_STEP_NUMBER: &str = "cicd.pipeline.task.step.number";

pub const WORKER_NAME: &str = "cicd.worker.name";
/// (extension)
pub const WORKER_LABELS: &str = "cicd.worker.labels";

pub const VCS_REF_HEAD_NAME: &str = "vcs.ref.head.name";
pub const VCS_REF_HEAD_REVISION: &str = "vcs.ref.head.revision";
