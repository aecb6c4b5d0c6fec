//! # ExamPrep: study assistant server
//!
//! Serves document upload, semantic search, MCQ generation and practice
//! sessions over HTTP.
//!
//! Usage:
//!   examprep                          # Start with ~/.examprep/config.toml
//!   examprep --port 8080              # Custom port
//!   examprep --config ./exam.toml     # Explicit config file
//!   examprep --init-config            # Write a default config and exit

use anyhow::Result;
use clap::Parser;
use examprep_core::ExamPrepConfig;
use examprep_db::StudyDb;
use examprep_gateway::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "examprep",
    version,
    about = "📚 ExamPrep: document Q&A and MCQ practice server"
)]
struct Cli {
    /// Config file (default: ~/.examprep/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Bind address, overrides gateway.host
    #[arg(long)]
    host: Option<String>,

    /// Port, overrides gateway.port
    #[arg(short, long)]
    port: Option<u16>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Write the default config to the config path and exit
    #[arg(long)]
    init_config: bool,
}

fn expand_path(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(p).to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "examprep=debug,examprep_gateway=debug,examprep_knowledge=debug,examprep_quiz=debug,examprep_providers=debug,tower_http=debug"
    } else {
        "examprep=info,examprep_gateway=info,examprep_knowledge=info,examprep_quiz=info,examprep_providers=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let config_path = cli
        .config
        .as_deref()
        .map(expand_path)
        .unwrap_or_else(ExamPrepConfig::default_path);

    if cli.init_config {
        if config_path.exists() {
            println!("⚠️  Config already exists: {}", config_path.display());
        } else {
            ExamPrepConfig::default().save_to(&config_path)?;
            println!("✅ Default config written to {}", config_path.display());
        }
        return Ok(());
    }

    let mut config = if config_path.exists() {
        ExamPrepConfig::load_from(&config_path)?
    } else {
        tracing::info!(
            "📝 No config at {}, using defaults",
            config_path.display()
        );
        ExamPrepConfig::default()
    };
    if let Some(host) = cli.host {
        config.gateway.host = host;
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }

    let db_path = expand_path(&config.storage.db_path);
    let upload_dir = expand_path(&config.storage.upload_dir);
    std::fs::create_dir_all(&upload_dir)?;

    let db = Arc::new(StudyDb::open(&db_path)?);
    tracing::info!("💾 Database: {}", db_path.display());

    let provider = examprep_providers::create_provider(&config)?;
    let state = AppState::new(config, db, provider, upload_dir)?;

    println!("📚 ExamPrep v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "   🌐 API: http://{}:{}/api/v1",
        state.config.gateway.host, state.config.gateway.port
    );
    println!();

    examprep_gateway::start(state).await
}
