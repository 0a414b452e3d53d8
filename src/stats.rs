//! Performance aggregation over historic class records.
//!
//! Reduces raw session records into per-(format, location, day, time)
//! statistics, optionally split by instructor. Pure functions over the
//! record slice: no state, no caching, identical output for identical
//! input. A key with zero records never appears, so `count >= 1` holds
//! for every stat by construction.
//!
//! Averages are kept at full precision for ranking; `rounded_*` helpers
//! give the one-decimal display values.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::LockedSeed;
use crate::models::{DayOfWeek, HistoricClassRecord, InstructorId, TimeOfDay};

/// Aggregation key: one timetable cell for one format, optionally split
/// by instructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    /// Class format name.
    pub format: String,
    /// Studio location.
    pub location: String,
    /// Day of week.
    pub day: DayOfWeek,
    /// Start time (minute precision).
    pub time: TimeOfDay,
    /// Instructor key, present only when grouping by instructor.
    pub instructor: Option<InstructorId>,
}

/// Accumulated performance for one group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceStat {
    /// Sum of participant counts.
    pub participants_sum: f64,
    /// Sum of session revenue.
    pub revenue_sum: f64,
    /// Number of sessions.
    pub count: u32,
}

impl PerformanceStat {
    /// Adds one record to the accumulator.
    fn add(&mut self, record: &HistoricClassRecord) {
        self.participants_sum += record.participants as f64;
        self.revenue_sum += record.revenue;
        self.count += 1;
    }

    /// Mean participants per session (full precision).
    pub fn avg_participants(&self) -> f64 {
        self.participants_sum / self.count as f64
    }

    /// Mean revenue per session (full precision).
    pub fn avg_revenue(&self) -> f64 {
        self.revenue_sum / self.count as f64
    }

    /// Mean participants rounded to one decimal, for display.
    pub fn rounded_avg_participants(&self) -> f64 {
        round1(self.avg_participants())
    }

    /// Mean revenue rounded to one decimal, for display.
    pub fn rounded_avg_revenue(&self) -> f64 {
        round1(self.avg_revenue())
    }
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Aggregates records into per-cell statistics.
///
/// Groups by (format, location, day, time), additionally by instructor
/// when `by_instructor` is set. O(n) over the records; deterministic.
pub fn aggregate(
    records: &[HistoricClassRecord],
    by_instructor: bool,
) -> HashMap<GroupKey, PerformanceStat> {
    let mut groups: HashMap<GroupKey, PerformanceStat> = HashMap::new();
    for record in records {
        let key = GroupKey {
            format: record.class_format.clone(),
            location: record.location.clone(),
            day: record.day,
            time: record.time,
            instructor: by_instructor.then(|| InstructorId::from_name(&record.instructor)),
        };
        groups.entry(key).or_default().add(record);
    }
    groups
}

/// A top-performing (format, location, day, time[, instructor]) combination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopPerformer {
    /// Class format name.
    pub class_format: String,
    /// Studio location.
    pub location: String,
    /// Day of week.
    pub day: DayOfWeek,
    /// Start time.
    pub time: TimeOfDay,
    /// Instructor display name, when known.
    pub instructor: Option<String>,
    /// Historic mean participants (0 for seeds with no history).
    pub average_participants: f64,
    /// Historic mean revenue (0 for seeds with no history).
    pub average_revenue: f64,
    /// Historic session count.
    pub occurrences: u32,
    /// Whether this entry came from the curated seed list.
    pub is_locked: bool,
}

/// Selects top-performing combinations from historic records.
///
/// Curated `seeds` always lead the result; computed entries follow,
/// deduplicated against the seeds by (format, location, day, time).
/// Computed entries need `count >= 2` and an average at or above
/// `min_average`. Averages within one participant of each other are
/// treated as tied and ordered by occurrence count descending.
pub fn select_top_performing(
    records: &[HistoricClassRecord],
    min_average: f64,
    by_instructor: bool,
    seeds: &[LockedSeed],
) -> Vec<TopPerformer> {
    let groups = aggregate(records, by_instructor);

    // First-seen display name per instructor key, for readable output.
    let mut display_names: HashMap<InstructorId, String> = HashMap::new();
    for record in records {
        display_names
            .entry(InstructorId::from_name(&record.instructor))
            .or_insert_with(|| record.instructor.clone());
    }

    let mut result: Vec<TopPerformer> = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let key = GroupKey {
            format: seed.class_format.clone(),
            location: seed.location.clone(),
            day: seed.day,
            time: seed.time,
            instructor: by_instructor.then(|| InstructorId::from_name(&seed.instructor)),
        };
        let stat = groups.get(&key);
        result.push(TopPerformer {
            class_format: seed.class_format.clone(),
            location: seed.location.clone(),
            day: seed.day,
            time: seed.time,
            instructor: Some(seed.instructor.clone()),
            average_participants: stat.map(|s| s.avg_participants()).unwrap_or(0.0),
            average_revenue: stat.map(|s| s.avg_revenue()).unwrap_or(0.0),
            occurrences: stat.map(|s| s.count).unwrap_or(0),
            is_locked: true,
        });
    }

    let mut computed: Vec<TopPerformer> = groups
        .iter()
        .filter(|(_, stat)| stat.count >= 2 && stat.avg_participants() >= min_average)
        .filter(|(key, _)| {
            !seeds.iter().any(|s| {
                s.class_format == key.format
                    && s.location == key.location
                    && s.day == key.day
                    && s.time == key.time
            })
        })
        .map(|(key, stat)| TopPerformer {
            class_format: key.format.clone(),
            location: key.location.clone(),
            day: key.day,
            time: key.time,
            instructor: key
                .instructor
                .as_ref()
                .and_then(|id| display_names.get(id).cloned()),
            average_participants: stat.avg_participants(),
            average_revenue: stat.avg_revenue(),
            occurrences: stat.count,
            is_locked: false,
        })
        .collect();

    // Averages within one participant count as tied; break ties by
    // frequency. Remaining ties fall back to full-precision average,
    // then key order for determinism.
    computed.sort_by(|a, b| {
        let bucket_a = a.average_participants.round() as i64;
        let bucket_b = b.average_participants.round() as i64;
        bucket_b
            .cmp(&bucket_a)
            .then(b.occurrences.cmp(&a.occurrences))
            .then(
                b.average_participants
                    .partial_cmp(&a.average_participants)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then(a.class_format.cmp(&b.class_format))
            .then(a.location.cmp(&b.location))
            .then(a.day.cmp(&b.day))
            .then(a.time.cmp(&b.time))
    });

    result.extend(computed);
    result
}
