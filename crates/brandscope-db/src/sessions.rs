//! Database operations for `analysis_sessions`.
//!
//! Status moves `pending → processing → completed | failed`. A finished
//! session may be processed again; each run appends its own result row.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl SessionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Processing => "processing",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(SessionStatus::Pending),
            "processing" => Some(SessionStatus::Processing),
            "completed" => Some(SessionStatus::Completed),
            "failed" => Some(SessionStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row from the `analysis_sessions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalysisSessionRow {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub universe_keywords: Option<String>,
    pub status: String,
    pub error_message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnalysisSessionRow {
    /// Parsed status; `None` only if the column holds a value the CHECK
    /// constraint would reject.
    #[must_use]
    pub fn status(&self) -> Option<SessionStatus> {
        SessionStatus::parse(&self.status)
    }
}

const SESSION_COLUMNS: &str = "id, public_id, name, universe_keywords, status, error_message, \
                               started_at, completed_at, created_at, updated_at";

/// Creates a session in `pending` status with a fresh public UUID.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_session(
    pool: &PgPool,
    name: &str,
    universe_keywords: Option<&str>,
) -> Result<AnalysisSessionRow, DbError> {
    let row = sqlx::query_as::<_, AnalysisSessionRow>(&format!(
        "INSERT INTO analysis_sessions (public_id, name, universe_keywords, status) \
         VALUES ($1, $2, $3, 'pending') \
         RETURNING {SESSION_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(universe_keywords)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetches a session by its public UUID.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no session has that id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_session(pool: &PgPool, public_id: Uuid) -> Result<AnalysisSessionRow, DbError> {
    sqlx::query_as::<_, AnalysisSessionRow>(&format!(
        "SELECT {SESSION_COLUMNS} FROM analysis_sessions WHERE public_id = $1"
    ))
    .bind(public_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Marks a session `processing`, clearing any previous outcome.
///
/// Any status except `processing` may start a run.
///
/// # Errors
///
/// Returns [`DbError::InvalidSessionTransition`] if the session is missing or
/// already processing, or [`DbError::Sqlx`] if the update fails.
pub async fn start_session(pool: &PgPool, public_id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE analysis_sessions \
         SET status = 'processing', started_at = NOW(), completed_at = NULL, \
             error_message = NULL, updated_at = NOW() \
         WHERE public_id = $1 AND status <> 'processing'",
    )
    .bind(public_id)
    .execute(pool)
    .await?;

    ensure_transition(result.rows_affected(), public_id, SessionStatus::Processing)
}

/// Marks a `processing` session `completed`.
///
/// # Errors
///
/// Returns [`DbError::InvalidSessionTransition`] if the session is not
/// processing, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_session(pool: &PgPool, public_id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE analysis_sessions \
         SET status = 'completed', completed_at = NOW(), updated_at = NOW() \
         WHERE public_id = $1 AND status = 'processing'",
    )
    .bind(public_id)
    .execute(pool)
    .await?;

    ensure_transition(result.rows_affected(), public_id, SessionStatus::Completed)
}

/// Marks a `processing` session `failed` with `error_message`.
///
/// # Errors
///
/// Returns [`DbError::InvalidSessionTransition`] if the session is not
/// processing, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_session(
    pool: &PgPool,
    public_id: Uuid,
    error_message: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE analysis_sessions \
         SET status = 'failed', completed_at = NOW(), error_message = $1, updated_at = NOW() \
         WHERE public_id = $2 AND status = 'processing'",
    )
    .bind(error_message)
    .bind(public_id)
    .execute(pool)
    .await?;

    ensure_transition(result.rows_affected(), public_id, SessionStatus::Failed)
}

fn ensure_transition(
    rows_affected: u64,
    public_id: Uuid,
    target: SessionStatus,
) -> Result<(), DbError> {
    if rows_affected == 0 {
        return Err(DbError::InvalidSessionTransition {
            public_id,
            target_status: target.as_str(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            SessionStatus::Pending,
            SessionStatus::Processing,
            SessionStatus::Completed,
            SessionStatus::Failed,
        ] {
            assert_eq!(SessionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SessionStatus::parse("running"), None);
    }

    #[test]
    fn zero_rows_affected_is_a_transition_error() {
        let id = Uuid::new_v4();
        let err = ensure_transition(0, id, SessionStatus::Completed).unwrap_err();
        assert!(matches!(
            err,
            DbError::InvalidSessionTransition {
                target_status: "completed",
                ..
            }
        ));
        assert!(ensure_transition(1, id, SessionStatus::Completed).is_ok());
    }
}
