//! Scheduling configuration.
//!
//! Consolidates every tunable the optimizer and rule set consume: hour
//! caps, performance thresholds, tier allow-lists, day guidelines, peak
//! slots, and the curated locked seed classes. Tier membership and format
//! lists are data here, not code, so studios can adjust them without
//! touching rule logic.
//!
//! Historically these numbers drifted between call sites; they are defined
//! once here and nowhere else.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{DayOfWeek, TimeOfDay};

/// Per-day scheduling guidance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayGuidelines {
    /// Formats to place first when filling this day.
    pub priority_formats: Vec<String>,
    /// Formats to keep off this day.
    pub avoid_formats: Vec<String>,
    /// Maximum classes per location on this day.
    pub max_classes: usize,
}

impl DayGuidelines {
    /// Creates guidelines with the given cap and no format lists.
    pub fn new(max_classes: usize) -> Self {
        Self {
            priority_formats: Vec::new(),
            avoid_formats: Vec::new(),
            max_classes,
        }
    }

    /// Adds a priority format.
    pub fn with_priority(mut self, format: impl Into<String>) -> Self {
        self.priority_formats.push(format.into());
        self
    }

    /// Adds an avoided format.
    pub fn with_avoid(mut self, format: impl Into<String>) -> Self {
        self.avoid_formats.push(format.into());
        self
    }
}

/// A hand-curated seed class, placed before any computed assignment and
/// never displaced by later phases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockedSeed {
    /// Class format name.
    pub class_format: String,
    /// Day of week.
    pub day: DayOfWeek,
    /// Start time.
    pub time: TimeOfDay,
    /// Studio location.
    pub location: String,
    /// Instructor display name.
    pub instructor: String,
}

impl LockedSeed {
    /// Creates a locked seed entry.
    pub fn new(
        class_format: impl Into<String>,
        day: DayOfWeek,
        time: TimeOfDay,
        location: impl Into<String>,
        instructor: impl Into<String>,
    ) -> Self {
        Self {
            class_format: class_format.into(),
            day,
            time,
            location: location.into(),
            instructor: instructor.into(),
        }
    }
}

/// All scheduling constants and business lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Weekly hour cap per instructor.
    pub weekly_cap_hours: f64,
    /// Weekly hour cap for new-tier instructors.
    pub new_tier_weekly_cap_hours: f64,
    /// Daily hour cap per instructor.
    pub daily_cap_hours: f64,
    /// Minimum days per week with zero assignments.
    pub min_days_off: usize,
    /// Margin before the weekly cap that triggers a soft warning.
    pub near_cap_warning_hours: f64,
    /// Minimum historic average for top-performer selection.
    pub top_performer_min_average: f64,
    /// Minimum historic average for phase-1 slot filling.
    pub fill_min_average: f64,
    /// The location that hosts PowerCycle (and excludes advanced formats).
    pub power_cycle_hub: String,
    /// Formats only new-tier instructors may teach.
    pub new_tier_formats: Vec<String>,
    /// Case-insensitive substrings marking senior-only formats.
    pub senior_only_markers: Vec<String>,
    /// Formats never auto-scheduled (hosted, one-off specials).
    pub excluded_formats: Vec<String>,
    /// Formats that must each appear at least `core_format_min_weekly`
    /// times per week.
    pub core_formats: Vec<String>,
    /// Weekly occurrence floor for each core format.
    pub core_format_min_weekly: usize,
    /// High-traffic start times that get parallel classes.
    pub peak_times: Vec<TimeOfDay>,
    /// Curated locked seed classes.
    pub locked_seeds: Vec<LockedSeed>,
    /// Per-day guidance.
    pub day_guidelines: HashMap<DayOfWeek, DayGuidelines>,
    /// Maximum recommendations returned per query.
    pub max_recommendations: usize,
    /// External recommender timeout in milliseconds.
    pub provider_timeout_ms: u64,
}

impl ScheduleConfig {
    /// Weekly cap for a given tier.
    pub fn weekly_cap_for(&self, tier: crate::models::InstructorTier) -> f64 {
        match tier {
            crate::models::InstructorTier::New => self.new_tier_weekly_cap_hours,
            _ => self.weekly_cap_hours,
        }
    }

    /// Guidelines for a day (falls back to an empty 12-class day).
    pub fn guidelines(&self, day: DayOfWeek) -> DayGuidelines {
        self.day_guidelines
            .get(&day)
            .cloned()
            .unwrap_or_else(|| DayGuidelines::new(12))
    }

    /// Sets the weekly hour cap.
    pub fn with_weekly_cap(mut self, hours: f64) -> Self {
        self.weekly_cap_hours = hours;
        self
    }

    /// Sets the external recommender timeout.
    pub fn with_provider_timeout_ms(mut self, ms: u64) -> Self {
        self.provider_timeout_ms = ms;
        self
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        let mut day_guidelines = HashMap::new();
        day_guidelines.insert(
            DayOfWeek::Monday,
            DayGuidelines::new(12)
                .with_priority("Studio Barre 57")
                .with_priority("Studio Mat 57")
                .with_avoid("Studio Recovery"),
        );
        day_guidelines.insert(
            DayOfWeek::Tuesday,
            DayGuidelines::new(12)
                .with_priority("Studio FIT")
                .with_priority("Studio Mat 57"),
        );
        day_guidelines.insert(
            DayOfWeek::Wednesday,
            DayGuidelines::new(12)
                .with_priority("Studio Barre 57")
                .with_priority("Studio Cardio Barre"),
        );
        day_guidelines.insert(
            DayOfWeek::Thursday,
            DayGuidelines::new(12)
                .with_priority("Studio Mat 57")
                .with_priority("Studio powerCycle"),
        );
        day_guidelines.insert(
            DayOfWeek::Friday,
            DayGuidelines::new(10)
                .with_priority("Studio FIT")
                .with_priority("Studio Barre 57 Express"),
        );
        day_guidelines.insert(
            DayOfWeek::Saturday,
            DayGuidelines::new(12)
                .with_priority("Studio Mat 57")
                .with_priority("Studio Barre 57"),
        );
        day_guidelines.insert(
            DayOfWeek::Sunday,
            DayGuidelines::new(5)
                .with_priority("Studio Recovery")
                .with_priority("Studio Mat 57")
                .with_avoid("Studio HIIT"),
        );

        let locked_seeds = vec![
            LockedSeed::new(
                "Studio Barre 57",
                DayOfWeek::Monday,
                TimeOfDay::new(9, 0),
                "Kwality House",
                "Anita Rao",
            ),
            LockedSeed::new(
                "Studio powerCycle",
                DayOfWeek::Monday,
                TimeOfDay::new(18, 0),
                "Supreme HQ, Bandra",
                "Vikram Shetty",
            ),
            LockedSeed::new(
                "Studio Mat 57",
                DayOfWeek::Tuesday,
                TimeOfDay::new(10, 0),
                "Kwality House",
                "Priya Nair",
            ),
            LockedSeed::new(
                "Studio FIT",
                DayOfWeek::Wednesday,
                TimeOfDay::new(18, 30),
                "Kenkere House",
                "Rohan Mehta",
            ),
            LockedSeed::new(
                "Studio HIIT",
                DayOfWeek::Thursday,
                TimeOfDay::new(19, 0),
                "Kwality House",
                "Vikram Shetty",
            ),
            LockedSeed::new(
                "Studio Barre 57 Express",
                DayOfWeek::Friday,
                TimeOfDay::new(7, 30),
                "Kwality House",
                "Anita Rao",
            ),
            LockedSeed::new(
                "Studio powerCycle",
                DayOfWeek::Friday,
                TimeOfDay::new(9, 0),
                "Supreme HQ, Bandra",
                "Meera Iyer",
            ),
            LockedSeed::new(
                "Studio Mat 57",
                DayOfWeek::Saturday,
                TimeOfDay::new(10, 15),
                "Kwality House",
                "Priya Nair",
            ),
            LockedSeed::new(
                "Studio Cardio Barre",
                DayOfWeek::Saturday,
                TimeOfDay::new(11, 0),
                "Kenkere House",
                "Rohan Mehta",
            ),
            LockedSeed::new(
                "Studio Recovery",
                DayOfWeek::Sunday,
                TimeOfDay::new(10, 0),
                "Kwality House",
                "Meera Iyer",
            ),
        ];

        Self {
            weekly_cap_hours: 15.0,
            new_tier_weekly_cap_hours: 10.0,
            daily_cap_hours: 4.0,
            min_days_off: 2,
            near_cap_warning_hours: 3.0,
            top_performer_min_average: 5.0,
            fill_min_average: 4.0,
            power_cycle_hub: "Supreme HQ, Bandra".into(),
            new_tier_formats: vec![
                "Studio Barre 57".into(),
                "Studio Barre 57 Express".into(),
                "Studio Mat 57".into(),
                "Studio Foundations".into(),
                "Studio Recovery".into(),
            ],
            senior_only_markers: vec!["hiit".into(), "amped up".into()],
            excluded_formats: vec!["Studio Hosted Class".into(), "Studio Pop-Up".into()],
            core_formats: vec![
                "Studio Barre 57".into(),
                "Studio Mat 57".into(),
                "Studio FIT".into(),
                "Studio powerCycle".into(),
            ],
            core_format_min_weekly: 3,
            peak_times: vec![
                TimeOfDay::new(9, 0),
                TimeOfDay::new(10, 0),
                TimeOfDay::new(18, 0),
                TimeOfDay::new(19, 0),
            ],
            locked_seeds,
            day_guidelines,
            max_recommendations: 5,
            provider_timeout_ms: 4_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InstructorTier;

    #[test]
    fn test_default_caps() {
        let cfg = ScheduleConfig::default();
        assert!((cfg.weekly_cap_hours - 15.0).abs() < 1e-10);
        assert!((cfg.new_tier_weekly_cap_hours - 10.0).abs() < 1e-10);
        assert!((cfg.daily_cap_hours - 4.0).abs() < 1e-10);
        assert_eq!(cfg.min_days_off, 2);
    }

    #[test]
    fn test_weekly_cap_by_tier() {
        let cfg = ScheduleConfig::default();
        assert!((cfg.weekly_cap_for(InstructorTier::New) - 10.0).abs() < 1e-10);
        assert!((cfg.weekly_cap_for(InstructorTier::Senior) - 15.0).abs() < 1e-10);
        assert!((cfg.weekly_cap_for(InstructorTier::Standard) - 15.0).abs() < 1e-10);
    }

    #[test]
    fn test_sunday_cap() {
        let cfg = ScheduleConfig::default();
        assert_eq!(cfg.guidelines(DayOfWeek::Sunday).max_classes, 5);
        for day in DayOfWeek::ALL.iter().filter(|d| **d != DayOfWeek::Sunday) {
            let g = cfg.guidelines(*day);
            assert!((10..=12).contains(&g.max_classes), "{day}: {}", g.max_classes);
        }
    }

    #[test]
    fn test_ten_locked_seeds() {
        let cfg = ScheduleConfig::default();
        assert_eq!(cfg.locked_seeds.len(), 10);
        assert_eq!(cfg.new_tier_formats.len(), 5);
        assert_eq!(cfg.core_formats.len(), 4);
    }
}
