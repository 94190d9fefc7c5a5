//! `analyze`, `analyze-file` and `report` command handlers.

use std::path::Path;
use std::time::Duration;

use brandscope_core::AppConfig;
use brandscope_db::{NewAnalysisResult, ResultField};
use brandscope_pipeline::{AnalysisOptions, AnalysisReport, Analyzer, PipelineError};
use brandscope_sources::{
    BrowserSession, ChatCompletionsGenerator, HttpSocialProvider, RemoteBrowserLauncher,
    SourceError,
};
use uuid::Uuid;

type LiveAnalyzer = Analyzer<HttpSocialProvider, RemoteBrowserLauncher, ChatCompletionsGenerator>;

/// Build the analyzer from config. Scraping and insight generation are
/// optional and switched off when their URLs are unset.
fn build_analyzer(config: &AppConfig) -> anyhow::Result<LiveAnalyzer> {
    let provider = HttpSocialProvider::from_config(config)?;
    let browser = optional(RemoteBrowserLauncher::from_config(config))?.map(BrowserSession::new);
    let generator = optional(ChatCompletionsGenerator::from_config(config))?;
    let options = AnalysisOptions::from_app_config(config)?;

    Ok(Analyzer::new(
        provider,
        browser,
        generator,
        options,
        Duration::from_secs(config.profile_cache_ttl_secs),
    ))
}

fn optional<T>(built: Result<T, SourceError>) -> anyhow::Result<Option<T>> {
    match built {
        Ok(value) => Ok(Some(value)),
        Err(SourceError::Disabled(what)) => {
            tracing::info!("{what} disabled");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_summary(report: &AnalysisReport) {
    println!("{:<28}{:>10}{:>10}{:>12}{:>10}", "brand", "equity", "reach", "engagement", "content");
    for row in &report.brand_equity_data {
        println!(
            "{:<28}{:>10.1}{:>10.2}{:>12.2}{:>10.2}",
            if row.is_focus {
                format!("{} *", row.brand)
            } else {
                row.brand.clone()
            },
            row.scores.equity_score,
            row.scores.reach_score,
            row.scores.engagement_score,
            row.scores.content_score,
        );
    }
}

pub(crate) async fn run_analyze(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    id: Uuid,
) -> anyhow::Result<()> {
    let analyzer = build_analyzer(config)?;
    match brandscope_pipeline::run_session(pool, &analyzer, id).await {
        Ok(report) => {
            print_summary(&report);
            Ok(())
        }
        Err(PipelineError::SessionNotFound(id)) => anyhow::bail!("session {id} not found"),
        Err(e) => Err(e.into()),
    }
}

/// Analyze a session file and print the full report document.
pub(crate) async fn run_analyze_file(
    config: &AppConfig,
    file: &Path,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let session = brandscope_core::load_session_file(file)?;
    let analyzer = build_analyzer(config)?;

    let report = analyzer.analyze(&session).await;
    let document = report.to_blobs()?.to_document();
    let json = serde_json::to_string_pretty(&document)?;

    match out {
        Some(path) => {
            tokio::fs::write(path, json).await?;
            print_summary(&report);
            println!("report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub(crate) async fn run_report(
    pool: &sqlx::PgPool,
    id: Uuid,
    field: Option<ResultField>,
) -> anyhow::Result<()> {
    let session = match brandscope_db::get_session(pool, id).await {
        Ok(session) => session,
        Err(brandscope_db::DbError::NotFound) => anyhow::bail!("session {id} not found"),
        Err(e) => return Err(e.into()),
    };
    let fetched = match field {
        Some(field) => brandscope_db::get_result_field(pool, session.id, field).await,
        None => brandscope_db::get_latest_result(pool, session.id)
            .await
            .map(|row| NewAnalysisResult::from(row).to_document()),
    };
    let value = match fetched {
        Ok(value) => value,
        Err(brandscope_db::DbError::NotFound) => {
            anyhow::bail!("session {id} has no stored result (status: {})", session.status)
        }
        Err(e) => return Err(e.into()),
    };

    match value {
        serde_json::Value::String(text) => println!("{text}"),
        other => println!("{}", serde_json::to_string_pretty(&other)?),
    }
    Ok(())
}
