//! Stored-session runs: load the session, analyze, append the result and
//! settle the status.
//!
//! Status is binary from the caller's point of view: a run ends
//! `completed` with a stored result, or `failed` with an error message.

use brandscope_core::{validate_session, SessionFile};
use brandscope_db::{
    complete_session, fail_session, get_session, insert_result, list_session_brands,
    start_session, AnalysisSessionRow, DbError, SessionBrandRow,
};
use brandscope_sources::{BrowserLauncher, SocialDataProvider, TextGenerator};
use sqlx::PgPool;
use uuid::Uuid;

use crate::analyzer::Analyzer;
use crate::error::PipelineError;
use crate::report::AnalysisReport;

/// Run the analysis for a stored session.
///
/// # Errors
///
/// Returns [`PipelineError::SessionNotFound`] if the session does not exist,
/// [`PipelineError::NoBrands`] or [`PipelineError::InvalidSession`] if its
/// brands cannot form a comparison, and [`PipelineError::Db`] or
/// [`PipelineError::Serialize`] if the result cannot be stored. Every error
/// after the session was started also marks it `failed`.
pub async fn run_session<P, L, G>(
    pool: &PgPool,
    analyzer: &Analyzer<P, L, G>,
    public_id: Uuid,
) -> Result<AnalysisReport, PipelineError>
where
    P: SocialDataProvider,
    L: BrowserLauncher,
    G: TextGenerator,
{
    let session = match get_session(pool, public_id).await {
        Ok(session) => session,
        Err(DbError::NotFound) => return Err(PipelineError::SessionNotFound(public_id)),
        Err(e) => return Err(e.into()),
    };

    start_session(pool, public_id).await?;
    tracing::info!(session = %public_id, name = %session.name, "analysis session started");

    let outcome = async {
        let report = analyze_and_store(pool, analyzer, &session).await?;
        complete_session(pool, public_id).await?;
        Ok::<_, PipelineError>(report)
    }
    .await;

    match outcome {
        Ok(report) => {
            tracing::info!(session = %public_id, "analysis session completed");
            Ok(report)
        }
        Err(e) => {
            fail_session_best_effort(pool, public_id, &e).await;
            Err(e)
        }
    }
}

async fn analyze_and_store<P, L, G>(
    pool: &PgPool,
    analyzer: &Analyzer<P, L, G>,
    session: &AnalysisSessionRow,
) -> Result<AnalysisReport, PipelineError>
where
    P: SocialDataProvider,
    L: BrowserLauncher,
    G: TextGenerator,
{
    let brands = list_session_brands(pool, session.id).await?;
    let request = session_request(session, &brands)?;

    let report = analyzer.analyze(&request).await;

    // Serialize everything before writing so a failure leaves no row behind.
    let blobs = report.to_blobs()?;
    insert_result(pool, session.id, &blobs).await?;
    Ok(report)
}

/// Rebuild the analysis request from stored rows: the focus brand first,
/// then competitors by position.
///
/// # Errors
///
/// Returns [`PipelineError::NoBrands`] if `brands` is empty, or
/// [`PipelineError::InvalidSession`] if the brands fail validation.
pub fn session_request(
    session: &AnalysisSessionRow,
    brands: &[SessionBrandRow],
) -> Result<SessionFile, PipelineError> {
    let mut ordered: Vec<&SessionBrandRow> = brands.iter().collect();
    ordered.sort_by_key(|b| (!b.is_focus, b.position));

    let (focus, competitors) = ordered
        .split_first()
        .ok_or(PipelineError::NoBrands(session.public_id))?;

    let request = SessionFile {
        focus: focus.to_profile(),
        competitors: competitors.iter().map(|b| b.to_profile()).collect(),
        universe_keywords: session.universe_keywords.clone(),
    };
    validate_session(&request).map_err(|e| PipelineError::InvalidSession(e.to_string()))?;
    Ok(request)
}

async fn fail_session_best_effort(pool: &PgPool, public_id: Uuid, error: &PipelineError) {
    tracing::error!(session = %public_id, error = %error, "analysis session failed");
    if let Err(mark_err) = fail_session(pool, public_id, &error.to_string()).await {
        tracing::error!(
            session = %public_id,
            error = %mark_err,
            "failed to mark analysis session as failed"
        );
    }
}
