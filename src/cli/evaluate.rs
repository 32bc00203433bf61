//! Batch evaluation command

use cofilter_core::RecordFilter;
use std::path::PathBuf;

use super::helpers::{build_filter, print_report};

/// Handle evaluation of all (optionally filtered) stored ratings
pub async fn handle(
    user: Option<String>,
    item: Option<String>,
    format: String,
    verbose: bool,
    global_db_path: Option<String>,
    config_path: Option<PathBuf>,
) -> cofilter_core::error::Result<()> {
    let filter = build_filter(global_db_path, config_path).await?;
    let report = filter.run(&RecordFilter::from_parts(user, item)).await?;
    print_report(&report, &format, verbose)
}
