//! Review import command

use cofilter_core::import::import_file;
use std::path::PathBuf;

use super::helpers::open_store;

/// Handle review import command
pub async fn handle(
    file: PathBuf,
    batch_size: usize,
    global_db_path: Option<String>,
) -> cofilter_core::error::Result<()> {
    let store = open_store(global_db_path, true).await?;
    let summary = import_file(&store, &file, batch_size).await?;

    println!("Imported {} records from {}", summary.stored, file.display());
    if summary.incomplete > 0 {
        println!("  {} records are incomplete and will be skipped when evaluating", summary.incomplete);
    }
    if summary.rejected > 0 {
        println!("  {} lines could not be parsed", summary.rejected);
    }
    Ok(())
}
