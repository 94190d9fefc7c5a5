//! `session` sub-commands: register a session from a YAML file and show a
//! stored session's status.

use std::path::PathBuf;

use brandscope_core::{load_session_file, SessionFile};
use clap::Subcommand;
use uuid::Uuid;

#[derive(Debug, Subcommand)]
pub enum SessionCommands {
    /// Store a session described by a YAML file and print its id
    Create {
        #[arg(long)]
        file: PathBuf,
        /// Display name; defaults to "<focus> vs <competitors>"
        #[arg(long)]
        name: Option<String>,
    },
    /// Show a session's status and brands
    Status {
        #[arg(long)]
        id: Uuid,
    },
}

pub(crate) async fn run_session_command(
    pool: &sqlx::PgPool,
    command: SessionCommands,
) -> anyhow::Result<()> {
    match command {
        SessionCommands::Create { file, name } => {
            run_session_create(pool, &file, name.as_deref()).await
        }
        SessionCommands::Status { id } => run_session_status(pool, id).await,
    }
}

/// Default display name for a session.
pub(crate) fn session_name(session: &SessionFile) -> String {
    if session.competitors.is_empty() {
        return session.focus.name.clone();
    }
    let competitors: Vec<&str> = session
        .competitors
        .iter()
        .map(|b| b.name.as_str())
        .collect();
    format!("{} vs {}", session.focus.name, competitors.join(", "))
}

async fn run_session_create(
    pool: &sqlx::PgPool,
    file: &std::path::Path,
    name: Option<&str>,
) -> anyhow::Result<()> {
    let session = load_session_file(file)?;
    let name = name.map_or_else(|| session_name(&session), str::to_string);

    let row =
        brandscope_db::create_session(pool, &name, session.universe_keywords.as_deref()).await?;
    let brands =
        brandscope_db::insert_session_brands(pool, row.id, &session.focus, &session.competitors)
            .await?;

    tracing::info!(session = %row.public_id, brands = brands.len(), "session created");
    println!("{}", row.public_id);
    Ok(())
}

async fn run_session_status(pool: &sqlx::PgPool, id: Uuid) -> anyhow::Result<()> {
    let session = match brandscope_db::get_session(pool, id).await {
        Ok(session) => session,
        Err(brandscope_db::DbError::NotFound) => anyhow::bail!("session {id} not found"),
        Err(e) => return Err(e.into()),
    };
    let brands = brandscope_db::list_session_brands(pool, session.id).await?;

    println!("Session: {} ({})", session.name, session.public_id);
    println!("Status:  {}", session.status);
    if let Some(started) = session.started_at {
        println!("Started: {}", started.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(completed) = session.completed_at {
        println!("Ended:   {}", completed.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(error) = &session.error_message {
        println!("Error:   {error}");
    }
    println!();
    for brand in &brands {
        let profile = brand.to_profile();
        let handles: Vec<String> = profile
            .handles
            .iter()
            .map(|(platform, handle)| format!("{platform}:{handle}"))
            .collect();
        println!(
            "{}{:<24} {}",
            if brand.is_focus { "* " } else { "  " },
            brand.name,
            handles.join(" ")
        );
    }
    Ok(())
}
