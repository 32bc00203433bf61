//! LibSQL rating store implementation
//!
//! Persists rating records in a single `ratings` table with indexes on
//! `user_id` and `item_id`, so both lookups the predictor issues per
//! neighbor stay cheap on large review dumps.

use crate::error::{CofilterError, Result};
use crate::storage::{RatingStore, RecordFilter};
use crate::types::{Rating, RatingRecord, UserHistory};
use async_trait::async_trait;
use chrono::Utc;
use libsql::params::Params;
use libsql::{params, Builder, Connection, Database, Value};
use std::path::Path;
use tracing::{debug, info, warn};

/// Schema statements, applied idempotently on open
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS ratings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT,
        item_id TEXT,
        stars INTEGER,
        imported_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_ratings_user ON ratings(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_ratings_item ON ratings(item_id)",
];

const SELECT_RECORDS: &str = "SELECT user_id, item_id, stars FROM ratings";

/// LibSQL rating store
pub struct LibsqlRatingStore {
    db: Database,
}

impl LibsqlRatingStore {
    /// Open a local database file
    ///
    /// With `create_if_missing = false` a missing file is an error, so
    /// evaluation never silently runs against an empty database.
    pub async fn open(path: &str, create_if_missing: bool) -> Result<Self> {
        let exists = Path::new(path).exists();
        if !exists && !create_if_missing {
            return Err(CofilterError::StoreUnavailable(format!(
                "Database file not found at '{}'. Run 'cofilter import <FILE>' first or check COFILTER_DB_PATH.",
                path
            )));
        }

        if create_if_missing {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        CofilterError::StoreUnavailable(format!(
                            "Failed to create database directory {}: {}",
                            parent.display(),
                            e
                        ))
                    })?;
                }
            }
        }

        info!("Opening rating database: {}", path);
        let db = Builder::new_local(path).build().await.map_err(|e| {
            CofilterError::StoreUnavailable(format!("Failed to open database '{}': {}", path, e))
        })?;

        let store = Self { db };
        store.check_health().await?;
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Get a connection from the database
    fn get_conn(&self) -> Result<Connection> {
        self.db
            .connect()
            .map_err(|e| CofilterError::StoreUnavailable(format!("Failed to get connection: {}", e)))
    }

    /// Verify the database answers a trivial query
    pub async fn check_health(&self) -> Result<()> {
        let conn = self.get_conn()?;
        match conn.query("SELECT 1", ()).await {
            Ok(_) => {
                debug!("Database health check passed");
                Ok(())
            }
            Err(e) => {
                let error_msg = e.to_string();
                if error_msg.contains("corrupt") || error_msg.contains("malformed") {
                    Err(CofilterError::StoreUnavailable(
                        "Database appears to be corrupted. Re-import the review file.".to_string(),
                    ))
                } else {
                    Err(CofilterError::StoreUnavailable(format!(
                        "Health check failed: {}",
                        error_msg
                    )))
                }
            }
        }
    }

    /// Create the ratings table and its lookup indexes
    async fn ensure_schema(&self) -> Result<()> {
        let conn = self.get_conn()?;
        for statement in SCHEMA {
            conn.execute(statement, ()).await.map_err(|e| {
                CofilterError::StoreUnavailable(format!("Failed to apply schema: {}", e))
            })?;
        }
        debug!("Ratings schema ready");
        Ok(())
    }

    async fn query_records(&self, sql: &str, params: Params) -> Result<Vec<RatingRecord>> {
        let conn = self.get_conn()?;
        let mut rows = conn.query(sql, params).await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(RatingRecord {
                user_id: text_value(row.get_value(0)?),
                item_id: text_value(row.get_value(1)?),
                stars: integer_value(row.get_value(2)?),
            });
        }
        Ok(records)
    }

    async fn query_ratings(&self, sql: &str, params: Params) -> Result<Vec<Rating>> {
        let records = self.query_records(sql, params).await?;
        let mut ratings = Vec::with_capacity(records.len());
        for record in records {
            match record.validate() {
                Ok(rating) => ratings.push(rating),
                Err(e) => debug!("Ignoring stored record in lookup: {}", e),
            }
        }
        Ok(ratings)
    }
}

fn text_value(value: Value) -> Option<String> {
    match value {
        Value::Text(text) => Some(text),
        Value::Integer(number) => Some(number.to_string()),
        _ => None,
    }
}

fn integer_value(value: Value) -> Option<i64> {
    match value {
        Value::Integer(number) => Some(number),
        Value::Real(number) if number.fract() == 0.0 => Some(number as i64),
        _ => None,
    }
}

fn text_param(text: &str) -> Value {
    Value::Text(text.to_string())
}

#[async_trait]
impl RatingStore for LibsqlRatingStore {
    async fn ratings_by_user(&self, user_id: &str) -> Result<UserHistory> {
        let sql = format!("{} WHERE user_id = ? ORDER BY id", SELECT_RECORDS);
        let ratings = self
            .query_ratings(&sql, Params::Positional(vec![text_param(user_id)]))
            .await?;
        Ok(UserHistory::from_ratings(ratings))
    }

    async fn ratings_by_item(&self, item_id: &str) -> Result<Vec<Rating>> {
        let sql = format!("{} WHERE item_id = ? ORDER BY id", SELECT_RECORDS);
        self.query_ratings(&sql, Params::Positional(vec![text_param(item_id)]))
            .await
    }

    async fn find_records(&self, filter: &RecordFilter) -> Result<Vec<RatingRecord>> {
        let (clause, values) = match filter {
            RecordFilter::All => (String::new(), vec![]),
            RecordFilter::User(user_id) => (" WHERE user_id = ?".to_string(), vec![text_param(user_id)]),
            RecordFilter::Item(item_id) => (" WHERE item_id = ?".to_string(), vec![text_param(item_id)]),
            RecordFilter::Pair { user_id, item_id } => (
                " WHERE user_id = ? AND item_id = ?".to_string(),
                vec![text_param(user_id), text_param(item_id)],
            ),
        };
        let sql = format!("{}{} ORDER BY id", SELECT_RECORDS, clause);
        let params = if values.is_empty() {
            Params::None
        } else {
            Params::Positional(values)
        };
        self.query_records(&sql, params).await
    }

    async fn store_records(&self, records: &[RatingRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let conn = self.get_conn()?;
        let now = Utc::now().timestamp();

        conn.execute("BEGIN", ()).await?;
        for record in records {
            let inserted = conn
                .execute(
                    "INSERT INTO ratings (user_id, item_id, stars, imported_at) VALUES (?, ?, ?, ?)",
                    params![
                        record.user_id.clone(),
                        record.item_id.clone(),
                        record.stars,
                        now
                    ],
                )
                .await;
            if let Err(e) = inserted {
                warn!("Rolling back batch of {} records: {}", records.len(), e);
                if let Err(rollback) = conn.execute("ROLLBACK", ()).await {
                    warn!("Rollback failed: {}", rollback);
                }
                return Err(CofilterError::StoreUnavailable(format!(
                    "Failed to insert rating record: {}",
                    e
                )));
            }
        }
        if let Err(e) = conn.execute("COMMIT", ()).await {
            warn!("Commit of {} records failed: {}", records.len(), e);
            if let Err(rollback) = conn.execute("ROLLBACK", ()).await {
                warn!("Rollback failed: {}", rollback);
            }
            return Err(CofilterError::StoreUnavailable(format!(
                "Failed to commit rating records: {}",
                e
            )));
        }

        debug!("Stored {} rating records", records.len());
        Ok(records.len())
    }

    async fn count_records(&self) -> Result<usize> {
        let conn = self.get_conn()?;
        let mut rows = conn.query("SELECT COUNT(*) FROM ratings", ()).await?;
        let count = match rows.next().await? {
            Some(row) => integer_value(row.get_value(0)?).unwrap_or(0),
            None => 0,
        };
        Ok(count.max(0) as usize)
    }
}
