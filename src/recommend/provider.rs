//! Recommendation provider interface.
//!
//! "Where do suggestions come from" is a capability with two
//! implementations behind one trait: a remote recommender (AI service,
//! supplied by the host) and the local heuristic ranking. The fallback is
//! a composition decision, not scattered error handling: `FallbackProvider`
//! tries the primary under a bounded timeout and degrades to the local
//! ranking on any failure, so callers never observe a provider error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::ranker::{rank_summaries, summarize_cell, Recommendation, StatScope, StatSummary};
use crate::models::{DayOfWeek, HistoricClassRecord, TimeOfDay};

/// Why an external provider call failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// The provider did not answer within the configured timeout.
    #[error("recommendation provider timed out")]
    Timeout,
    /// The provider answered with something unusable.
    #[error("malformed provider response: {0}")]
    Malformed(String),
    /// The call itself failed (network, non-2xx, ...).
    #[error("provider transport error: {0}")]
    Transport(String),
}

/// A cell description plus aggregated history, sent to providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest {
    /// Day of week being scheduled.
    pub day: DayOfWeek,
    /// Slot start time.
    pub time: TimeOfDay,
    /// Studio location.
    pub location: String,
    /// Aggregated stats for the cell (widened scope when the exact cell
    /// has no history).
    pub summary: Vec<StatSummary>,
    /// Scope the summary was computed at.
    pub scope: StatScope,
    /// Maximum recommendations wanted.
    pub limit: usize,
}

impl RecommendationRequest {
    /// Builds a request from raw historic records.
    pub fn from_records(
        records: &[HistoricClassRecord],
        day: DayOfWeek,
        time: TimeOfDay,
        location: impl Into<String>,
        limit: usize,
    ) -> Self {
        let location = location.into();
        let (summary, scope) = summarize_cell(records, day, time, &location);
        Self {
            day,
            time,
            location,
            summary,
            scope,
            limit,
        }
    }

    /// Ranks the request's own summary with the local heuristic.
    pub fn local_ranking(&self) -> Vec<Recommendation> {
        rank_summaries(&self.summary, self.limit, self.scope)
    }
}

/// A source of slot recommendations.
#[async_trait]
pub trait RecommendationProvider: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &'static str;

    /// Produces ranked recommendations for a cell.
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<Recommendation>, ProviderError>;
}

/// The local heuristic as a provider. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRanker;

#[async_trait]
impl RecommendationProvider for LocalRanker {
    fn name(&self) -> &'static str {
        "local-heuristic"
    }

    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<Recommendation>, ProviderError> {
        Ok(request.local_ranking())
    }
}

/// Tries a primary provider under a timeout, falling back to the local
/// ranking on timeout, error, or an empty/out-of-band response.
pub struct FallbackProvider {
    primary: Box<dyn RecommendationProvider>,
    timeout: Duration,
}

impl FallbackProvider {
    /// Creates a fallback composition around a primary provider.
    pub fn new(primary: Box<dyn RecommendationProvider>, timeout: Duration) -> Self {
        Self { primary, timeout }
    }

    /// Creates a fallback composition using the configured timeout.
    pub fn from_config(
        primary: Box<dyn RecommendationProvider>,
        config: &crate::config::ScheduleConfig,
    ) -> Self {
        Self::new(primary, Duration::from_millis(config.provider_timeout_ms))
    }

    /// Produces recommendations, never failing.
    ///
    /// External priorities are rescaled into the local 1-5 band and the
    /// result truncated to the requested limit.
    pub async fn recommend(&self, request: &RecommendationRequest) -> Vec<Recommendation> {
        match tokio::time::timeout(self.timeout, self.primary.recommend(request)).await {
            Ok(Ok(mut recommendations)) if !recommendations.is_empty() => {
                for r in &mut recommendations {
                    r.priority = r.priority.clamp(1, 5);
                    r.confidence = r.confidence.clamp(0.0, 1.0);
                }
                recommendations.truncate(request.limit);
                recommendations
            }
            Ok(Ok(_)) => {
                log::debug!(
                    "provider '{}' returned no recommendations, using local ranking",
                    self.primary.name()
                );
                request.local_ranking()
            }
            Ok(Err(err)) => {
                log::warn!(
                    "provider '{}' failed ({err}), using local ranking",
                    self.primary.name()
                );
                request.local_ranking()
            }
            Err(_) => {
                log::warn!(
                    "provider '{}' timed out after {:?}, using local ranking",
                    self.primary.name(),
                    self.timeout
                );
                request.local_ranking()
            }
        }
    }
}
