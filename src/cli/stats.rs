//! Database statistics command

use cofilter_core::{config::resolve_db_path, RatingStore};

use super::helpers::open_store;

/// Handle stats command
pub async fn handle(global_db_path: Option<String>) -> cofilter_core::error::Result<()> {
    let db_path = resolve_db_path(global_db_path.clone());
    let store = open_store(global_db_path, false).await?;
    let count = store.count_records().await?;

    println!("Database: {}", db_path);
    println!("Rating records: {}", count);
    Ok(())
}
