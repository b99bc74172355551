//! In-memory metrics store shared by every connection handler.
//!
//! [`MetricsStore`] holds the zone metrics and recommendations behind a
//! single exclusive [`Mutex`]. Every operation, read or write, holds the lock
//! for its whole duration and readers copy the entries out before releasing
//! it, so a handler can never observe a half-appended entry.
//!
//! The store is populated once by [`MetricsStore::initialize`] before the
//! acceptor starts. The append operations are the entry point for a future
//! ingestion path; no HTTP endpoint writes to the store.

use std::collections::HashSet;

use crowdwatch_types::{
    Recommendation, RecommendationId, ZoneId, ZoneIdError, ZoneMetric, MAX_MESSAGE_LEN,
};
use tokio::sync::Mutex;

use crate::seed;

/// Default maximum number of zone metric entries.
pub const DEFAULT_METRIC_CAPACITY: usize = 64;

/// Default maximum number of recommendation entries.
pub const DEFAULT_RECOMMENDATION_CAPACITY: usize = 64;

/// Capacity limits for a [`MetricsStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum number of [`ZoneMetric`] entries.
    pub metric_capacity: usize,
    /// Maximum number of [`Recommendation`] entries.
    pub recommendation_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            metric_capacity: DEFAULT_METRIC_CAPACITY,
            recommendation_capacity: DEFAULT_RECOMMENDATION_CAPACITY,
        }
    }
}

/// Which sequence of the store an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// The zone metric sequence.
    Metric,
    /// The recommendation sequence.
    Recommendation,
}

impl core::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Metric => f.write_str("metric"),
            Self::Recommendation => f.write_str("recommendation"),
        }
    }
}

/// Errors returned by store mutations. Reads never fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// [`MetricsStore::initialize`] was called a second time.
    #[error("store is already initialized")]
    AlreadyInitialized,

    /// Appending would exceed the configured capacity.
    #[error("{kind} capacity of {capacity} exceeded")]
    CapacityExceeded {
        /// The sequence that is full.
        kind: EntryKind,
        /// The configured capacity.
        capacity: usize,
    },

    /// A seed or appended entry carries an invalid zone id.
    #[error("invalid zone id: {0}")]
    InvalidZoneId(#[from] ZoneIdError),

    /// A metric has a negative or non-finite density, or a non-finite trend.
    #[error("invalid metric for zone {zone_id}: {reason}")]
    InvalidMetric {
        /// Zone of the rejected metric.
        zone_id: ZoneId,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A recommendation message is longer than [`MAX_MESSAGE_LEN`] bytes.
    #[error("recommendation {id} message is {len} bytes, limit is {MAX_MESSAGE_LEN}")]
    MessageTooLong {
        /// Id of the rejected recommendation.
        id: String,
        /// Actual message length in bytes.
        len: usize,
    },

    /// A recommendation id is already in the store or repeats within a batch.
    #[error("duplicate recommendation id {id}")]
    DuplicateRecommendationId {
        /// The repeated id.
        id: String,
    },
}

#[derive(Debug, Default)]
struct StoreInner {
    initialized: bool,
    metrics: Vec<ZoneMetric>,
    recommendations: Vec<Recommendation>,
}

impl StoreInner {
    fn push_metric(&mut self, metric: ZoneMetric, capacity: usize) -> Result<(), StoreError> {
        validate_metric(&metric)?;
        if self.metrics.len() >= capacity {
            return Err(StoreError::CapacityExceeded {
                kind: EntryKind::Metric,
                capacity,
            });
        }
        self.metrics.push(metric);
        Ok(())
    }

    fn push_recommendation(
        &mut self,
        recommendation: Recommendation,
        capacity: usize,
    ) -> Result<(), StoreError> {
        validate_recommendation(&recommendation)?;
        if self.recommendations.iter().any(|r| r.id == recommendation.id) {
            return Err(StoreError::DuplicateRecommendationId {
                id: recommendation.id.into_inner(),
            });
        }
        if self.recommendations.len() >= capacity {
            return Err(StoreError::CapacityExceeded {
                kind: EntryKind::Recommendation,
                capacity,
            });
        }
        self.recommendations.push(recommendation);
        Ok(())
    }
}

/// Mutex-guarded store of zone metrics and recommendations.
///
/// Owned by the server and shared with handlers through an [`Arc`](std::sync::Arc).
#[derive(Debug)]
pub struct MetricsStore {
    config: StoreConfig,
    inner: Mutex<StoreInner>,
}

impl MetricsStore {
    /// Create an empty, uninitialized store.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(StoreInner::default()),
        }
    }

    /// The capacity limits this store was created with.
    pub const fn config(&self) -> StoreConfig {
        self.config
    }

    /// Populate the store with the built-in seed zones and recommendations.
    ///
    /// Must run once, before the acceptor starts serving.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        let now = chrono::Utc::now().timestamp();
        let metrics = seed::seed_metrics(now)?;
        let recommendations = seed::seed_recommendations(now)?;
        self.initialize_with(metrics, recommendations).await
    }

    /// Populate the store with the given entries.
    ///
    /// Either every entry is stored or none is. The whole batch is validated
    /// against the remaining capacity before anything is appended after any
    /// entries recorded earlier.
    pub async fn initialize_with(
        &self,
        metrics: Vec<ZoneMetric>,
        recommendations: Vec<Recommendation>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.initialized {
            return Err(StoreError::AlreadyInitialized);
        }

        check_batch(
            EntryKind::Metric,
            inner.metrics.len().saturating_add(metrics.len()),
            self.config.metric_capacity,
        )?;
        check_batch(
            EntryKind::Recommendation,
            inner
                .recommendations
                .len()
                .saturating_add(recommendations.len()),
            self.config.recommendation_capacity,
        )?;
        metrics.iter().try_for_each(validate_metric)?;
        recommendations.iter().try_for_each(validate_recommendation)?;
        check_unique_ids(&inner.recommendations, &recommendations)?;

        inner.metrics.extend(metrics);
        inner.recommendations.extend(recommendations);
        inner.initialized = true;
        Ok(())
    }

    /// Append one zone metric sample.
    pub async fn record_metric(&self, metric: ZoneMetric) -> Result<(), StoreError> {
        let capacity = self.config.metric_capacity;
        self.inner.lock().await.push_metric(metric, capacity)
    }

    /// Append one recommendation.
    pub async fn record_recommendation(
        &self,
        recommendation: Recommendation,
    ) -> Result<(), StoreError> {
        let capacity = self.config.recommendation_capacity;
        self.inner
            .lock()
            .await
            .push_recommendation(recommendation, capacity)
    }

    /// All metric samples for `zone_id`, in insertion order.
    ///
    /// Matching is byte-exact. An unknown zone yields an empty vector.
    pub async fn metrics_for_zone(&self, zone_id: &ZoneId) -> Vec<ZoneMetric> {
        let inner = self.inner.lock().await;
        inner
            .metrics
            .iter()
            .filter(|m| m.zone_id == *zone_id)
            .cloned()
            .collect()
    }

    /// Every recommendation, in insertion order.
    pub async fn all_recommendations(&self) -> Vec<Recommendation> {
        self.inner.lock().await.recommendations.clone()
    }

    /// Number of stored metric samples.
    pub async fn metric_count(&self) -> usize {
        self.inner.lock().await.metrics.len()
    }

    /// Number of stored recommendations.
    pub async fn recommendation_count(&self) -> usize {
        self.inner.lock().await.recommendations.len()
    }
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

const fn check_batch(kind: EntryKind, total: usize, capacity: usize) -> Result<(), StoreError> {
    if total > capacity {
        return Err(StoreError::CapacityExceeded { kind, capacity });
    }
    Ok(())
}

fn check_unique_ids(
    existing: &[Recommendation],
    batch: &[Recommendation],
) -> Result<(), StoreError> {
    let mut seen: HashSet<&RecommendationId> = existing.iter().map(|r| &r.id).collect();
    for recommendation in batch {
        if !seen.insert(&recommendation.id) {
            return Err(StoreError::DuplicateRecommendationId {
                id: recommendation.id.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_metric(metric: &ZoneMetric) -> Result<(), StoreError> {
    let reason = if !metric.density.is_finite() {
        "density is not finite"
    } else if metric.density < 0.0 {
        "density is negative"
    } else if !metric.trend.is_finite() {
        "trend is not finite"
    } else {
        return Ok(());
    };
    Err(StoreError::InvalidMetric {
        zone_id: metric.zone_id.clone(),
        reason,
    })
}

fn validate_recommendation(recommendation: &Recommendation) -> Result<(), StoreError> {
    let len = recommendation.message.len();
    if len > MAX_MESSAGE_LEN {
        return Err(StoreError::MessageTooLong {
            id: recommendation.id.to_string(),
            len,
        });
    }
    Ok(())
}
