//! Local recommendation ranking.
//!
//! Ranks (format, instructor) candidates for a single timetable cell from
//! historic statistics. When the exact cell has no history the ranking
//! cascades to location-wide stats, then to global stats — a data gap is
//! never an error.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{DayOfWeek, HistoricClassRecord, TimeOfDay};
use crate::stats::round1;

/// Confidence ceiling: historic frequency alone never fully certifies a
/// recommendation.
const MAX_CONFIDENCE: f64 = 0.9;

/// How far the ranker had to widen its search to find history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatScope {
    /// Exact (day, time, location) cell.
    Cell,
    /// Any day/time at the requested location.
    Location,
    /// All records.
    Global,
}

/// Aggregated history for one (format, instructor) pair within a scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatSummary {
    /// Class format name.
    pub class_format: String,
    /// Instructor display name.
    pub instructor_name: String,
    /// Mean participants per session.
    pub average_participants: f64,
    /// Mean revenue per session.
    pub average_revenue: f64,
    /// Number of historic sessions.
    pub occurrences: u32,
}

/// A ranked suggestion for a timetable cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Suggested class format.
    pub class_format: String,
    /// Suggested instructor display name.
    pub instructor_name: String,
    /// Confidence in [0, 0.9], grown by historic frequency.
    pub confidence: f64,
    /// Expected participants (historic mean, one decimal).
    pub expected_participants: f64,
    /// Expected revenue (historic mean, one decimal).
    pub expected_revenue: f64,
    /// Priority band, 5 (best) down to 1.
    pub priority: u8,
    /// Why this was suggested.
    pub reasoning: String,
}

/// Summarizes history for a cell, widening scope until records are found.
///
/// Returns the summaries plus the scope that produced them. Empty input
/// yields an empty summary at global scope.
pub fn summarize_cell(
    records: &[HistoricClassRecord],
    day: DayOfWeek,
    time: TimeOfDay,
    location: &str,
) -> (Vec<StatSummary>, StatScope) {
    let cell: Vec<&HistoricClassRecord> = records
        .iter()
        .filter(|r| r.day == day && r.time == time && r.location.eq_ignore_ascii_case(location))
        .collect();
    if !cell.is_empty() {
        return (summarize(&cell), StatScope::Cell);
    }

    let location_wide: Vec<&HistoricClassRecord> = records
        .iter()
        .filter(|r| r.location.eq_ignore_ascii_case(location))
        .collect();
    if !location_wide.is_empty() {
        return (summarize(&location_wide), StatScope::Location);
    }

    let all: Vec<&HistoricClassRecord> = records.iter().collect();
    (summarize(&all), StatScope::Global)
}

fn summarize(records: &[&HistoricClassRecord]) -> Vec<StatSummary> {
    // Group by (format, normalized instructor), keep first-seen display name.
    let mut groups: HashMap<(String, String), (String, f64, f64, u32)> = HashMap::new();
    for r in records {
        let key = (
            r.class_format.clone(),
            crate::models::InstructorId::from_name(&r.instructor)
                .as_str()
                .to_string(),
        );
        let entry = groups
            .entry(key)
            .or_insert_with(|| (r.instructor.clone(), 0.0, 0.0, 0));
        entry.1 += r.participants as f64;
        entry.2 += r.revenue;
        entry.3 += 1;
    }

    groups
        .into_iter()
        .map(
            |((format, _), (name, participants, revenue, count))| StatSummary {
                class_format: format,
                instructor_name: name,
                average_participants: participants / count as f64,
                average_revenue: revenue / count as f64,
                occurrences: count,
            },
        )
        .collect()
}

/// Ranks summaries into priority-ordered recommendations.
///
/// Sorted by average participants descending, ties broken by frequency.
/// Priority runs 5 down to 1 by rank position; confidence is
/// `min(0.9, occurrences / 10)`.
pub fn rank_summaries(
    summaries: &[StatSummary],
    limit: usize,
    scope: StatScope,
) -> Vec<Recommendation> {
    let mut ordered: Vec<&StatSummary> = summaries.iter().collect();
    ordered.sort_by(|a, b| {
        b.average_participants
            .partial_cmp(&a.average_participants)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.occurrences.cmp(&a.occurrences))
            .then(a.class_format.cmp(&b.class_format))
            .then(a.instructor_name.cmp(&b.instructor_name))
    });

    let scope_note = match scope {
        StatScope::Cell => "in this slot",
        StatScope::Location => "at this location",
        StatScope::Global => "across all locations",
    };

    ordered
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(idx, s)| Recommendation {
            class_format: s.class_format.clone(),
            instructor_name: s.instructor_name.clone(),
            confidence: (s.occurrences as f64 / 10.0).min(MAX_CONFIDENCE),
            expected_participants: round1(s.average_participants),
            expected_revenue: round1(s.average_revenue),
            priority: (5_usize.saturating_sub(idx)).max(1) as u8,
            reasoning: format!(
                "Averaged {:.1} participants over {} session{} {}",
                s.average_participants,
                s.occurrences,
                if s.occurrences == 1 { "" } else { "s" },
                scope_note
            ),
        })
        .collect()
}

/// Ranks recommendations for a cell directly from historic records.
pub fn rank(
    records: &[HistoricClassRecord],
    day: DayOfWeek,
    time: TimeOfDay,
    location: &str,
    limit: usize,
) -> Vec<Recommendation> {
    let (summaries, scope) = summarize_cell(records, day, time, location);
    rank_summaries(&summaries, limit, scope)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        format: &str,
        location: &str,
        day: DayOfWeek,
        time: TimeOfDay,
        instructor: &str,
        participants: u32,
    ) -> HistoricClassRecord {
        HistoricClassRecord::new(format, location, day, time, instructor)
            .with_participants(participants)
            .with_revenue(participants as f64 * 700.0)
    }

    #[test]
    fn test_exact_cell_scenario() {
        // Ten sessions of Studio Mat 57 at Kwality House, Saturday 10:15,
        // averaging 25 participants.
        let mut records = Vec::new();
        for i in 0..10 {
            records.push(record(
                "Studio Mat 57",
                "Kwality House",
                DayOfWeek::Saturday,
                TimeOfDay::new(10, 15),
                "Priya Nair",
                25 + (i % 2),
            ));
        }
        // Noise elsewhere
        records.push(record(
            "Studio FIT",
            "Kenkere House",
            DayOfWeek::Monday,
            TimeOfDay::new(18, 0),
            "Rohan Mehta",
            30,
        ));

        let recs = rank(
            &records,
            DayOfWeek::Saturday,
            TimeOfDay::new(10, 15),
            "Kwality House",
            5,
        );
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].class_format, "Studio Mat 57");
        assert_eq!(recs[0].priority, 5);
        assert!((recs[0].confidence - 0.9).abs() < 1e-10);
        assert!(recs[0].expected_participants >= 25.0);
    }

    #[test]
    fn test_falls_back_to_location_then_global() {
        let records = vec![record(
            "Studio Barre 57",
            "Kwality House",
            DayOfWeek::Monday,
            TimeOfDay::new(9, 0),
            "Anita Rao",
            18,
        )];

        // No history for Friday 17:00 at Kwality House → location scope
        let (summaries, scope) = summarize_cell(
            &records,
            DayOfWeek::Friday,
            TimeOfDay::new(17, 0),
            "Kwality House",
        );
        assert_eq!(scope, StatScope::Location);
        assert_eq!(summaries.len(), 1);

        // No history at Kenkere House at all → global scope
        let (summaries, scope) = summarize_cell(
            &records,
            DayOfWeek::Friday,
            TimeOfDay::new(17, 0),
            "Kenkere House",
        );
        assert_eq!(scope, StatScope::Global);
        assert_eq!(summaries.len(), 1);
    }

    #[test]
    fn test_priority_bands_descend() {
        let summaries: Vec<StatSummary> = (0..6)
            .map(|i| StatSummary {
                class_format: format!("Format {i}"),
                instructor_name: "Anita Rao".into(),
                average_participants: 30.0 - i as f64,
                average_revenue: 10_000.0,
                occurrences: 5,
            })
            .collect();

        let recs = rank_summaries(&summaries, 5, StatScope::Cell);
        assert_eq!(recs.len(), 5);
        let priorities: Vec<u8> = recs.iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![5, 4, 3, 2, 1]);
        assert_eq!(recs[0].class_format, "Format 0");
    }

    #[test]
    fn test_frequency_breaks_ties() {
        let summaries = vec![
            StatSummary {
                class_format: "Rare".into(),
                instructor_name: "Anita Rao".into(),
                average_participants: 20.0,
                average_revenue: 10_000.0,
                occurrences: 2,
            },
            StatSummary {
                class_format: "Frequent".into(),
                instructor_name: "Priya Nair".into(),
                average_participants: 20.0,
                average_revenue: 10_000.0,
                occurrences: 9,
            },
        ];
        let recs = rank_summaries(&summaries, 5, StatScope::Cell);
        assert_eq!(recs[0].class_format, "Frequent");
        assert!((recs[0].confidence - 0.9).abs() < 1e-10);
        assert!((recs[1].confidence - 0.2).abs() < 1e-10);
    }

    #[test]
    fn test_empty_records_yield_empty_ranking() {
        let recs = rank(
            &[],
            DayOfWeek::Monday,
            TimeOfDay::new(9, 0),
            "Kwality House",
            5,
        );
        assert!(recs.is_empty());
    }

    #[test]
    fn test_limit_respected() {
        let mut records = Vec::new();
        for i in 0..8 {
            records.push(record(
                &format!("Format {i}"),
                "Kwality House",
                DayOfWeek::Monday,
                TimeOfDay::new(9, 0),
                "Anita Rao",
                10 + i,
            ));
        }
        let recs = rank(
            &records,
            DayOfWeek::Monday,
            TimeOfDay::new(9, 0),
            "Kwality House",
            5,
        );
        assert_eq!(recs.len(), 5);
    }
}
