use brandscope_db::DbError;
use thiserror::Error;
use uuid::Uuid;

/// Failures that abort an analysis run. Everything else degrades the
/// affected slice of the report instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("analysis session {0} not found")]
    SessionNotFound(Uuid),

    #[error("analysis session {0} has no brands")]
    NoBrands(Uuid),

    #[error("invalid analysis session: {0}")]
    InvalidSession(String),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("failed to serialize analysis result: {0}")]
    Serialize(#[from] serde_json::Error),
}
