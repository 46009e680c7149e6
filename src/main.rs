use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use case_intelligence::{
    config::{Config, LogFormat},
    views, CaseSession,
};

/// Headless runner for the case analysis pipeline.
#[derive(Parser, Debug)]
#[command(name = "case-intel", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a case document and store the result in history
    Analyze {
        /// Plain-text case document
        file: PathBuf,

        /// Evidence files to upload before the analysis
        #[arg(long)]
        evidence: Vec<PathBuf>,

        /// Case name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
    },

    /// List stored analyses, newest first
    History,

    /// Check that the analysis service is reachable
    Health,

    /// Compute a filing deadline
    Deadline {
        /// Start date, YYYY-MM-DD
        start: String,

        /// appeal, reply, rejoinder, civil_revision, criminal_revision, limitation
        kind: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Command::Deadline { start, kind } = &cli.command {
        println!("{}", views::deadline_for(start, kind)?);
        return Ok(());
    }

    let session = match CaseSession::connect(config).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to initialize session");
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Analyze {
            file,
            evidence,
            name,
        } => analyze(&session, file, evidence, name).await,
        Command::History => {
            for snapshot in session.history().await? {
                let case_type = snapshot
                    .analysis
                    .as_ok()
                    .and_then(|a| a.case_type.clone())
                    .unwrap_or_else(|| "N/A".to_string());
                println!(
                    "{}  {}  {}  {}",
                    snapshot.id,
                    snapshot.timestamp.format("%Y-%m-%d %H:%M"),
                    snapshot.name,
                    case_type
                );
            }
            Ok(())
        }
        Command::Health => {
            let health = session.health().await?;
            println!(
                "status: {}  backend: {}  models: {}",
                health.status,
                health.backend.as_deref().unwrap_or("unknown"),
                health.models.join(", ")
            );
            if !health.is_healthy() {
                std::process::exit(2);
            }
            Ok(())
        }
        Command::Deadline { .. } => Ok(()),
    }
}

async fn analyze(
    session: &CaseSession,
    file: PathBuf,
    evidence: Vec<PathBuf>,
    name: Option<String>,
) -> anyhow::Result<()> {
    for path in evidence {
        let content = tokio::fs::read(&path).await?;
        let filename = file_name(&path);
        match session.upload_evidence(&filename, content).await {
            Ok(item) => info!(filename = %item.filename, "Evidence added"),
            Err(e) => error!(filename = %filename, error = %e, "Evidence upload failed"),
        }
    }

    let text = tokio::fs::read_to_string(&file).await?;
    let name = name.unwrap_or_else(|| file_name(&file));

    let snapshot = session.analyze(&name, &text).await?;
    info!(snapshot_id = %snapshot.id, "Analysis stored");

    println!("{}", session.summary().await);
    if let Some(notice) = session.workspace().lock().await.notice() {
        eprintln!("{}", notice);
    }
    Ok(())
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
