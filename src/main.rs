//! Jobtrack CLI - run and inspect the job application tracker

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use jobtrack::config::{self, JobtrackConfig};
use jobtrack::storage::SqliteStore;
use jobtrack::ui;
use jobtrack::RecordService;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "jobtrack")]
#[command(version)]
#[command(about = "Job application tracker - REST API over SQLite with résumé attachments")]
#[command(long_about = r#"
Jobtrack keeps a list of job applications (company, role, status, date
applied) with an optional résumé attachment, and serves them to the browser
client over a small REST API.

Example usage:
  jobtrack init
  jobtrack serve --port 3000
  jobtrack list
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server
    Serve {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Maximum accepted request body size, in bytes
        #[arg(long)]
        max_upload_bytes: Option<usize>,
    },

    /// Write a default config file and prepare the database directory
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// List tracked applications, most recent first
    List {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let file_config = config::load_config(cli.config.as_deref())?.unwrap_or_default();

    match cli.command {
        Commands::Serve { database, host, port, max_upload_bytes } => {
            let settings = JobtrackConfig {
                database: database.map(|p| p.to_string_lossy().to_string()).or(file_config.database),
                host: host.or(file_config.host),
                port: port.or(file_config.port),
                max_upload_bytes: max_upload_bytes.or(file_config.max_upload_bytes),
            };

            let db_path = settings.database_path();
            config::ensure_db_dir(&db_path)?;
            let store = SqliteStore::open(&db_path)?;
            tracing::info!("Opened database {:?}", db_path);

            let addr: SocketAddr = format!("{}:{}", settings.host(), settings.port()).parse()?;
            jobtrack::server::start_server(addr, RecordService::new(store), settings.max_upload_bytes()).await?;
        }

        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            let defaults = JobtrackConfig::with_defaults();

            if let Err(e) = config::write_config(&path, &defaults, force) {
                ui::error(&e.to_string());
                return Err(e);
            }
            config::ensure_db_dir(&defaults.database_path())?;

            ui::success(&format!("Wrote config to {}", path.display()));
            ui::info("Database", &defaults.database_path().display().to_string());
            ui::info("Listen", &format!("{}:{}", defaults.host(), defaults.port()));
        }

        Commands::List { database, json } => {
            let db_path = database.unwrap_or_else(|| file_config.database_path());
            let service = RecordService::new(SqliteStore::open(&db_path)?);
            let records = service.list().await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("∅ No applications tracked yet.");
            } else {
                ui::header(&format!("{} applications ({})", records.len(), db_path.display()));
                println!("{}", ui::records_table(&records));
            }
        }
    }

    Ok(())
}
