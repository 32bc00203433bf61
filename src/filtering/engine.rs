//! Prediction orchestration and batch evaluation
//!
//! For one stored rating, the filter loads the author's history and every
//! other rating of the same item, scores each other rater against the author,
//! keeps the usable ones as neighbors, and aggregates their stars. A batch
//! run does this for every selected record and reports the RMSE.

use crate::config::FilteringConfig;
use crate::error::{CofilterError, Result};
use crate::filtering::accuracy::evaluate;
use crate::filtering::neighbors::NeighborSelector;
use crate::filtering::prediction::weighted_prediction;
use crate::filtering::similarity::similarity_with_min_common;
use crate::storage::cache::UserHistoryCache;
use crate::storage::{RatingStore, RecordFilter};
use crate::types::{AccuracyReport, Neighbor, PredictionResult, RatingRecord, UserHistory};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Outcome of a batch run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    /// One entry per well-formed record, in store order
    pub results: Vec<PredictionResult>,
    /// Records skipped because a field was missing or out of range
    pub malformed: usize,
    pub accuracy: AccuracyReport,
}

impl BatchReport {
    /// Results that produced a prediction
    pub fn predicted(&self) -> impl Iterator<Item = &PredictionResult> {
        self.results.iter().filter(|r| r.has_prediction())
    }

    /// Number of records without enough neighbor data to predict
    pub fn insufficient(&self) -> usize {
        self.results.iter().filter(|r| !r.has_prediction()).count()
    }
}

/// User-based collaborative filter over a rating store
#[derive(Clone)]
pub struct CollaborativeFilter {
    store: Arc<dyn RatingStore>,
    config: FilteringConfig,
    selector: NeighborSelector,
    cache: Option<Arc<UserHistoryCache>>,
}

impl CollaborativeFilter {
    pub fn new(store: Arc<dyn RatingStore>, config: FilteringConfig) -> Self {
        let selector = NeighborSelector::from(&config);
        Self {
            store,
            config,
            selector,
            cache: None,
        }
    }

    /// Use an explicit history cache for every lookup made by this filter
    pub fn with_cache(mut self, cache: Arc<UserHistoryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &FilteringConfig {
        &self.config
    }

    pub fn cache(&self) -> Option<&Arc<UserHistoryCache>> {
        self.cache.as_ref()
    }

    async fn history(&self, user_id: &str) -> Result<Arc<UserHistory>> {
        match &self.cache {
            Some(cache) => cache.get_or_load(self.store.as_ref(), user_id).await,
            None => Ok(Arc::new(self.store.ratings_by_user(user_id).await?)),
        }
    }

    /// Predict one stored rating from the other raters of its item
    ///
    /// Returns `Ok(None)` for a malformed record. A result whose
    /// `predicted_stars` is `None` means no usable neighbor was found. Only
    /// store failures are returned as errors.
    pub async fn predict_rating(&self, record: &RatingRecord) -> Result<Option<PredictionResult>> {
        let target = match record.validate() {
            Ok(rating) => rating,
            Err(e) => {
                warn!("Skipping record {:?}: {}", record, e);
                return Ok(None);
            }
        };

        debug!(
            "Predicting user {} for item {}",
            target.user_id, target.item_id
        );

        let target_history = self.history(&target.user_id).await?;
        let item_ratings = self.store.ratings_by_item(&target.item_id).await?;

        let mut candidates = Vec::new();
        for other in item_ratings {
            if other.user_id == target.user_id {
                continue;
            }

            let other_history = self.history(&other.user_id).await?;
            let score = similarity_with_min_common(
                &target_history,
                &other_history,
                &target.item_id,
                self.config.min_common,
            );

            // Stars come from the rater's history, where the latest duplicate wins
            let Some(stars) = other_history.stars(&target.item_id) else {
                continue;
            };

            if let Some(similarity) = score.filter(|s| self.selector.policy().is_usable(Some(s))) {
                let neighbor = Neighbor {
                    rater_id: other.user_id,
                    stars,
                    similarity,
                };
                debug!("Accepted neighbor {}", neighbor);
                candidates.push(neighbor);
            }
        }

        let total_candidate_count = candidates.len();
        let selection = self.selector.select(candidates);
        let predicted_stars = weighted_prediction(&selection.neighbors, selection.limit);

        let result = PredictionResult {
            user_id: target.user_id,
            item_id: target.item_id,
            actual_stars: target.stars,
            total_candidate_count,
            used_count: selection.limit,
            predicted_stars,
        };

        if result.has_prediction() {
            info!("{}", result);
        } else {
            info!("Insufficient data to predict rating: {}", result);
        }

        Ok(Some(result))
    }

    /// Predict every record selected by `filter` and measure the RMSE
    ///
    /// Predictions run concurrently, bounded by `config.concurrency`. A store
    /// failure in any prediction fails the whole run.
    pub async fn run(&self, filter: &RecordFilter) -> Result<BatchReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!("batch", run_id = %run_id, filter = %filter);
        self.run_batch(filter).instrument(span).await
    }

    async fn run_batch(&self, filter: &RecordFilter) -> Result<BatchReport> {
        // A cache requested by configuration lives exactly as long as this run
        let runner = match (&self.cache, self.config.cache_histories) {
            (None, true) => Arc::new(self.clone().with_cache(Arc::new(UserHistoryCache::new()))),
            _ => Arc::new(self.clone()),
        };

        let records = self.store.find_records(filter).await?;
        info!("Evaluating {} records", records.len());

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let mut tasks = JoinSet::new();

        let mut outcomes = Vec::new();
        for (index, record) in records.into_iter().enumerate() {
            // Surface failures from finished predictions before scheduling more
            while let Some(joined) = tasks.try_join_next() {
                if let Err(e) = Self::collect(joined, &mut outcomes) {
                    tasks.abort_all();
                    return Err(e);
                }
            }

            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| CofilterError::TaskFailed(e.to_string()))?;
            let runner = Arc::clone(&runner);
            tasks.spawn(
                async move {
                    let _permit = permit;
                    (index, runner.predict_rating(&record).await)
                }
                .in_current_span(),
            );
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = Self::collect(joined, &mut outcomes) {
                tasks.abort_all();
                return Err(e);
            }
        }
        outcomes.sort_by_key(|(index, _)| *index);

        let mut malformed = 0;
        let mut results = Vec::with_capacity(outcomes.len());
        for (_, outcome) in outcomes {
            match outcome {
                Some(result) => results.push(result),
                None => malformed += 1,
            }
        }

        let accuracy = evaluate(&results);
        if let Some(cache) = runner.cache() {
            let stats = cache.stats().await;
            debug!(
                "History cache: {} users, {} hits, {} misses",
                stats.entries, stats.hits, stats.misses
            );
        }
        info!("{}", accuracy);

        Ok(BatchReport {
            results,
            malformed,
            accuracy,
        })
    }

    /// Record one finished prediction, or return the error that ends the batch
    fn collect(
        joined: std::result::Result<(usize, Result<Option<PredictionResult>>), JoinError>,
        outcomes: &mut Vec<(usize, Option<PredictionResult>)>,
    ) -> Result<()> {
        let (index, outcome) = joined?;
        match outcome {
            Ok(result) => {
                outcomes.push((index, result));
                Ok(())
            }
            Err(e) => {
                warn!("Aborting batch: {}", e);
                Err(e)
            }
        }
    }
}
