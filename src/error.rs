use std::path::PathBuf;

/// Crate-wide error type.
///
/// Mirrors the shape of the teacher's per-command `Result<T, String>`
/// handlers, but as a structured enum so the CLI can map each variant to
/// a distinct process exit code instead of pattern-matching on strings.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("configuration error in {path}: {reason}")]
    ConfigurationError { path: PathBuf, reason: String },

    #[error("no feasible schedule: {reason}")]
    InfeasibleError { reason: String },

    #[error("mandatory block '{task}' {start}..{end} has no available physician")]
    UnavailableForMandatoryBlock {
        task: String,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("loaded schedule has overlapping assignments for {physician}: {first} and {second}")]
    OverlapInLoadedSchedule {
        physician: String,
        first: String,
        second: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
