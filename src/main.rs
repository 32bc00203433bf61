//! Cofilter - collaborative filtering rating predictor
//!
//! Command-line entry point: import review dumps into a rating database,
//! predict a single stored rating, or evaluate every stored rating and
//! report the RMSE.

mod cli;

use clap::{Parser, Subcommand};
use cofilter_core::error::Result;
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(name = "cofilter")]
#[command(about = "User-based collaborative filtering rating predictor", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Database path (overrides COFILTER_DB_PATH env var and default)
    #[arg(long)]
    db_path: Option<String>,

    /// Configuration file (TOML); COFILTER_* env vars override it
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a JSON-lines review file into the rating database
    Import {
        /// Review file, one JSON object per line
        file: PathBuf,

        /// Records written per transaction
        #[arg(long, default_value = "1000")]
        batch_size: usize,
    },

    /// Predict one stored rating from the item's other raters
    Predict {
        /// User who wrote the rating
        #[arg(short, long)]
        user: String,

        /// Item (business) that was rated
        #[arg(short, long)]
        item: String,

        /// Output format (text or json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Predict every stored rating and report the RMSE
    Evaluate {
        /// Only evaluate ratings by this user
        #[arg(short, long)]
        user: Option<String>,

        /// Only evaluate ratings of this item
        #[arg(short, long)]
        item: Option<String>,

        /// Output format (text or json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Also print a line per evaluated rating (text format)
        #[arg(long)]
        verbose: bool,
    },

    /// Show the number of stored rating records
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Use specified level for our crates, but WARN for the database driver
    let filter = EnvFilter::new(format!(
        "cofilter={level},cofilter_core={level},libsql=warn",
        level = level.as_str().to_lowercase()
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();

    debug!("Cofilter v{} starting...", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Import { file, batch_size } => {
            cli::import::handle(file, batch_size, cli.db_path).await
        }
        Commands::Predict { user, item, format } => {
            cli::predict::handle(user, item, format, cli.db_path, cli.config).await
        }
        Commands::Evaluate {
            user,
            item,
            format,
            verbose,
        } => cli::evaluate::handle(user, item, format, verbose, cli.db_path, cli.config).await,
        Commands::Stats => cli::stats::handle(cli.db_path).await,
    }
}
