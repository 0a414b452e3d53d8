//! Constraint rule set.
//!
//! Pure predicates encoding the hard business rules: location format
//! allow-lists, the restricted midday band, the fixed slot grid, tier
//! eligibility, format durations, and parallel-class capacity. `Rules`
//! carries no mutable state; it only borrows lists and names from its
//! configuration, so one instance is safely shared read-only across
//! concurrent optimization strategies.
//!
//! Format matching is case-insensitive substring matching against
//! configured marker lists, mirroring how the booking system names
//! classes ("Studio Barre 57 Express (Sweat in 30)" still reads as
//! an express format).

use crate::config::{DayGuidelines, ScheduleConfig};
use crate::models::{DayOfWeek, InstructorTier, TimeOfDay};

/// Start of the restricted midday band (inclusive).
const RESTRICTED_START: TimeOfDay = TimeOfDay::new(12, 0);
/// End of the restricted midday band (exclusive).
const RESTRICTED_END: TimeOfDay = TimeOfDay::new(17, 0);

/// The hard business rules, parameterized by configuration.
#[derive(Debug, Clone)]
pub struct Rules {
    config: ScheduleConfig,
}

impl Rules {
    /// Creates the rule set from a configuration.
    pub fn new(config: ScheduleConfig) -> Self {
        Self { config }
    }

    /// The underlying configuration.
    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Whether a class format may run at a location.
    ///
    /// The PowerCycle hub hosts everything except advanced formats
    /// (HIIT, Amped Up); every other location hosts everything except
    /// PowerCycle.
    pub fn format_allowed_at(&self, format: &str, location: &str) -> bool {
        if self.is_power_cycle_hub(location) {
            !self.is_advanced_format(format)
        } else {
            !contains_ci(format, "powercycle") && !contains_ci(format, "power cycle")
        }
    }

    /// Whether a start time is blocked by the restricted midday band.
    ///
    /// [12:00, 17:00) is off-limits for non-private classes; private
    /// sessions are exempt.
    pub fn is_restricted_time(&self, time: TimeOfDay, is_private: bool) -> bool {
        if is_private {
            return false;
        }
        time >= RESTRICTED_START && time < RESTRICTED_END
    }

    /// The bookable slot grid, identical for every day.
    ///
    /// Morning 07:30-11:30 and evening 17:00-19:30, 30-minute steps.
    pub fn available_slots(&self) -> Vec<TimeOfDay> {
        let mut slots = Vec::with_capacity(15);
        let mut m = 7 * 60 + 30;
        while m <= 11 * 60 + 30 {
            slots.push(TimeOfDay::new(m / 60, m % 60));
            m += 30;
        }
        let mut e = 17 * 60;
        while e <= 19 * 60 + 30 {
            slots.push(TimeOfDay::new(e / 60, e % 60));
            e += 30;
        }
        slots
    }

    /// Midday slots bookable only as private sessions (12:00-16:30).
    pub fn restricted_slots(&self) -> Vec<TimeOfDay> {
        let mut slots = Vec::with_capacity(10);
        let mut m = 12 * 60;
        while m <= 16 * 60 + 30 {
            slots.push(TimeOfDay::new(m / 60, m % 60));
            m += 30;
        }
        slots
    }

    /// Whether an instructor tier may teach a format.
    ///
    /// New-tier instructors teach only from a fixed allow-list; advanced
    /// formats require senior tier.
    pub fn tier_eligible(&self, tier: InstructorTier, format: &str) -> bool {
        if tier == InstructorTier::New {
            return self
                .config
                .new_tier_formats
                .iter()
                .any(|f| f.eq_ignore_ascii_case(format));
        }
        if self.is_advanced_format(format) {
            return tier == InstructorTier::Senior;
        }
        true
    }

    /// Class duration in fractional hours, derived from the format name.
    pub fn class_duration(&self, format: &str) -> f64 {
        if contains_ci(format, "express") {
            0.75
        } else if contains_ci(format, "recovery") || contains_ci(format, "sweat in 30") {
            0.5
        } else {
            1.0
        }
    }

    /// How many classes may run in parallel at a location.
    pub fn parallel_capacity(&self, location: &str) -> usize {
        if self.is_power_cycle_hub(location) {
            3
        } else {
            2
        }
    }

    /// Per-day scheduling guidance.
    pub fn day_guidelines(&self, day: DayOfWeek) -> DayGuidelines {
        self.config.guidelines(day)
    }

    /// Whether a start time is a configured high-traffic slot.
    pub fn is_peak(&self, time: TimeOfDay) -> bool {
        self.config.peak_times.contains(&time)
    }

    /// Whether a format is never auto-scheduled (hosted classes etc.).
    pub fn is_excluded_format(&self, format: &str) -> bool {
        self.config
            .excluded_formats
            .iter()
            .any(|f| f.eq_ignore_ascii_case(format))
    }

    fn is_power_cycle_hub(&self, location: &str) -> bool {
        location.eq_ignore_ascii_case(&self.config.power_cycle_hub)
    }

    fn is_advanced_format(&self, format: &str) -> bool {
        self.config
            .senior_only_markers
            .iter()
            .any(|m| contains_ci(format, m))
    }
}

/// Case-insensitive substring test.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
