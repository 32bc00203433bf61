//! Shared helper functions for CLI commands
//!
//! Database opening, configuration loading and report rendering used by
//! more than one subcommand.

use cofilter_core::{
    config::resolve_db_path, error::Result, BatchReport, CollaborativeFilter, FilteringConfig,
    LibsqlRatingStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Open the rating database named by CLI arg, env var, or default
pub async fn open_store(db_path: Option<String>, create_if_missing: bool) -> Result<LibsqlRatingStore> {
    let db_path = resolve_db_path(db_path);
    debug!("Using database: {}", db_path);
    LibsqlRatingStore::open(&db_path, create_if_missing).await
}

/// Build a collaborative filter over the existing database
pub async fn build_filter(
    db_path: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<CollaborativeFilter> {
    let config = FilteringConfig::load(config_path.as_deref())?;
    let store = open_store(db_path, false).await?;
    Ok(CollaborativeFilter::new(Arc::new(store), config))
}

/// Print a batch report in the requested format
pub fn print_report(report: &BatchReport, format: &str, verbose: bool) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if verbose {
        for result in &report.results {
            println!("{}", result);
        }
        println!();
    }

    println!("{}", report.accuracy);
    println!("  Predicted:         {}", report.accuracy.count);
    println!("  Insufficient data: {}", report.insufficient());
    println!("  Malformed records: {}", report.malformed);
    Ok(())
}
