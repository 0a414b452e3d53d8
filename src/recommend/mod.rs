//! Slot recommendations.
//!
//! Ranks candidate (format, instructor) pairs for a single timetable cell
//! by historic performance, with cascading fallback (cell → location →
//! global) when history is thin. An optional external recommender plugs
//! in behind `RecommendationProvider`; its failures always degrade to the
//! local ranking.

mod provider;
mod ranker;

pub use provider::{
    FallbackProvider, LocalRanker, ProviderError, RecommendationProvider, RecommendationRequest,
};
pub use ranker::{
    rank, rank_summaries, summarize_cell, Recommendation, StatScope, StatSummary,
};

use crate::models::{DayOfWeek, HistoricClassRecord, TimeOfDay};

/// Default number of recommendations returned per query.
pub const DEFAULT_LIMIT: usize = 5;

/// Ranks up to five recommendations for a cell, synchronously, using the
/// local heuristic only.
pub fn get_recommendations(
    records: &[HistoricClassRecord],
    day: DayOfWeek,
    time: TimeOfDay,
    location: &str,
) -> Vec<Recommendation> {
    rank(records, day, time, location, DEFAULT_LIMIT)
}
