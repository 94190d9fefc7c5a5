mod analyze;
mod session;

use std::path::PathBuf;

use brandscope_db::ResultField;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "brandscope")]
#[command(about = "Comparative social media analytics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Create and inspect analysis sessions
    Session {
        #[command(subcommand)]
        command: session::SessionCommands,
    },
    /// Run the analysis for a stored session and store the result
    Analyze {
        /// Session id printed by `session create`
        #[arg(long)]
        id: Uuid,
    },
    /// Analyze a session file without touching the database
    AnalyzeFile {
        /// YAML session file
        #[arg(long)]
        file: PathBuf,
        /// Write the JSON report here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print a session's latest stored result, or one field of it, as JSON
    Report {
        #[arg(long)]
        id: Uuid,
        /// Report key or column name, e.g. `brandEquityData` or `share_of_voice`.
        /// Omit to print the whole report.
        #[arg(long)]
        field: Option<ResultField>,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Verify the database connection
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = brandscope_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            let pool = connect(&config).await?;
            brandscope_db::ping(&pool).await?;
            println!("database ok");
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let pool = connect(&config).await?;
            let applied = brandscope_db::run_migrations(&pool).await?;
            println!("applied {applied} migrations");
        }
        Commands::Session { command } => {
            let pool = connect(&config).await?;
            session::run_session_command(&pool, command).await?;
        }
        Commands::Analyze { id } => {
            let pool = connect(&config).await?;
            analyze::run_analyze(&pool, &config, id).await?;
        }
        Commands::AnalyzeFile { file, out } => {
            analyze::run_analyze_file(&config, &file, out.as_deref()).await?;
        }
        Commands::Report { id, field } => {
            let pool = connect(&config).await?;
            analyze::run_report(&pool, id, field).await?;
        }
    }

    Ok(())
}

async fn connect(config: &brandscope_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = brandscope_db::PoolConfig::from_app_config(config);
    Ok(brandscope_db::connect_pool(&config.database_url, pool_config).await?)
}
