//! Review file import
//!
//! Loads JSON-lines review dumps (one object per line with `user_id`,
//! `business_id` and `stars`) into a rating store. Lines that are not valid
//! review objects are rejected; objects missing a field are stored anyway and
//! show up as malformed records when evaluated.

use crate::error::Result;
use crate::storage::RatingStore;
use crate::types::RatingRecord;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

/// Records written to the store per round trip
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Counters of one import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Non-blank lines read
    pub lines: usize,
    /// Records written to the store
    pub stored: usize,
    /// Lines that could not be parsed as a review
    pub rejected: usize,
    /// Stored records that will not validate (missing field, bad stars)
    pub incomplete: usize,
}

/// Import a review file from disk
pub async fn import_file(
    store: &dyn RatingStore,
    path: &Path,
    batch_size: usize,
) -> Result<ImportSummary> {
    info!("Importing reviews from {}", path.display());
    let reader = BufReader::new(File::open(path)?);
    import_reader(store, reader, batch_size).await
}

/// Import reviews from any buffered reader
pub async fn import_reader<R: BufRead>(
    store: &dyn RatingStore,
    reader: R,
    batch_size: usize,
) -> Result<ImportSummary> {
    let batch_size = batch_size.max(1);
    let mut summary = ImportSummary::default();
    let mut batch = Vec::with_capacity(batch_size);

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        summary.lines += 1;

        let record: RatingRecord = match serde_json::from_str(trimmed) {
            Ok(record) => record,
            Err(e) => {
                debug!("Rejected line {}: {}", index + 1, e);
                summary.rejected += 1;
                continue;
            }
        };
        if record.validate().is_err() {
            summary.incomplete += 1;
        }
        batch.push(record);

        if batch.len() >= batch_size {
            summary.stored += store.store_records(&batch).await?;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        summary.stored += store.store_records(&batch).await?;
    }

    if summary.rejected > 0 {
        warn!("Rejected {} unparseable lines", summary.rejected);
    }
    info!(
        "Imported {} records ({} incomplete)",
        summary.stored, summary.incomplete
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::InMemoryRatingStore;
    use crate::storage::RecordFilter;
    use std::io::Cursor;

    const REVIEWS: &str = r#"{"review_id":"r1","user_id":"u1","business_id":"b1","stars":5}
{"review_id":"r2","user_id":"u2","business_id":"b1","stars":4.0}

not json at all
{"review_id":"r3","user_id":"u3","stars":2}
{"review_id":"r4","user_id":"u1","business_id":"b2","stars":7}
"#;

    #[tokio::test]
    async fn test_import_counts_and_stores() {
        let store = InMemoryRatingStore::new();
        let summary = import_reader(&store, Cursor::new(REVIEWS), 2).await.unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                lines: 5,
                stored: 4,
                rejected: 1,
                incomplete: 2,
            }
        );
        assert_eq!(store.count_records().await.unwrap(), 4);

        let records = store.find_records(&RecordFilter::All).await.unwrap();
        assert_eq!(records[1], RatingRecord::new("u2", "b1", 4));
        assert_eq!(records[2].item_id, None);
    }

    #[tokio::test]
    async fn test_import_missing_file_is_io_error() {
        let store = InMemoryRatingStore::new();
        let result = import_file(&store, Path::new("/nonexistent/reviews.json"), 10).await;
        assert!(matches!(result, Err(crate::error::CofilterError::Io(_))));
    }
}
