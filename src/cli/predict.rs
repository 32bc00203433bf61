//! Single rating prediction command

use cofilter_core::RecordFilter;
use std::path::PathBuf;

use super::helpers::{build_filter, print_report};

/// Handle prediction of one (user, item) rating
pub async fn handle(
    user: String,
    item: String,
    format: String,
    global_db_path: Option<String>,
    config_path: Option<PathBuf>,
) -> cofilter_core::error::Result<()> {
    let filter = build_filter(global_db_path, config_path).await?;
    let report = filter
        .run(&RecordFilter::Pair {
            user_id: user.clone(),
            item_id: item.clone(),
        })
        .await?;

    if report.results.is_empty() && format != "json" {
        println!("No valid rating by '{}' for '{}' found", user, item);
        return Ok(());
    }

    print_report(&report, &format, true)
}
