//! Manual scheduling surface.
//!
//! Front-ends that let a human edit a generated schedule check candidate
//! assignments here before committing them. Validation re-derives load
//! accounting from the schedule itself, so it agrees with the optimizer
//! even for schedules that were edited by hand since generation.

use std::collections::HashMap;

use crate::models::{
    ClassAssignment, DayOfWeek, Instructor, InstructorId, ScheduleWarning, WarningKind,
    WeeklySchedule,
};
use crate::rules::Rules;
use crate::tracker::InstructorLoadTracker;

/// Result of validating one candidate assignment.
///
/// An error makes the candidate invalid; a warning flags a soft concern
/// (approaching the weekly cap) on an otherwise valid candidate.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    /// Whether the candidate may be committed.
    pub is_valid: bool,
    /// Soft concern on a valid candidate.
    pub warning: Option<String>,
    /// Hard rule violation.
    pub error: Option<String>,
}

impl ValidationOutcome {
    fn ok() -> Self {
        Self {
            is_valid: true,
            warning: None,
            error: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            warning: Some(message.into()),
            error: None,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            warning: None,
            error: Some(message.into()),
        }
    }
}

/// Validates a candidate assignment against a committed schedule.
///
/// Checks every hard rule the optimizer enforces: the restricted midday
/// band, the location's format allow-list, format uniqueness and capacity
/// within the cell, instructor double-booking, and the full load rules
/// (tier, availability, caps, days off, one location per day).
pub fn validate_assignment(
    schedule: &WeeklySchedule,
    candidate: &ClassAssignment,
    roster: &[Instructor],
    rules: &Rules,
) -> ValidationOutcome {
    if rules.is_restricted_time(candidate.time, candidate.is_private) {
        return ValidationOutcome::fail(format!(
            "{} starts at {}, inside the restricted 12:00-17:00 band; \
             only private sessions may run then",
            candidate.class_format, candidate.time
        ));
    }

    if !rules.format_allowed_at(&candidate.class_format, &candidate.location) {
        return ValidationOutcome::fail(format!(
            "{} is not offered at {}",
            candidate.class_format, candidate.location
        ));
    }

    if schedule.format_in_cell(
        candidate.day,
        candidate.time,
        &candidate.location,
        &candidate.class_format,
    ) {
        return ValidationOutcome::fail(format!(
            "{} already runs at {} on {} {}",
            candidate.class_format, candidate.location, candidate.day, candidate.time
        ));
    }

    let occupied = schedule
        .assignments_in_cell(candidate.day, candidate.time, &candidate.location)
        .len();
    let capacity = rules.parallel_capacity(&candidate.location);
    if occupied >= capacity {
        return ValidationOutcome::fail(format!(
            "{} already holds {occupied} parallel classes at {} {} (capacity {capacity})",
            candidate.location, candidate.day, candidate.time
        ));
    }

    if schedule.instructor_busy_at(&candidate.instructor, candidate.day, candidate.time) {
        return ValidationOutcome::fail(format!(
            "{} already teaches another class at {} {}",
            candidate.instructor_name, candidate.day, candidate.time
        ));
    }

    // Rebuild load accounting from the schedule as committed.
    let mut tracker = InstructorLoadTracker::new(roster, rules.clone());
    for a in &schedule.assignments {
        tracker.commit(&a.instructor, a.day, a.time, &a.location, a.duration_hours);
    }
    if let Err(rejection) = tracker.can_assign(
        &candidate.instructor,
        candidate.day,
        &candidate.location,
        candidate.duration_hours,
        &candidate.class_format,
    ) {
        return ValidationOutcome::fail(rejection.to_string());
    }

    let after = tracker.weekly_hours(&candidate.instructor) + candidate.duration_hours;
    let cap = tracker.weekly_cap(&candidate.instructor);
    if cap - after <= rules.config().near_cap_warning_hours {
        return ValidationOutcome::warn(format!(
            "{} would reach {after:.2}h of a {cap:.1}h weekly cap",
            candidate.instructor_name
        ));
    }

    ValidationOutcome::ok()
}

/// Total assigned hours per instructor, derived from the schedule.
pub fn compute_instructor_hours(schedule: &WeeklySchedule) -> HashMap<InstructorId, f64> {
    schedule.instructor_hours()
}

/// Post-hoc load audit over a finished schedule.
///
/// Returns warnings for weekly/daily cap breaches and days-off
/// shortfalls. Used by the optimizer's final pass and available to
/// callers re-auditing hand-edited schedules.
pub fn audit_instructor_hours(
    schedule: &WeeklySchedule,
    roster: &[Instructor],
    rules: &Rules,
) -> Vec<ScheduleWarning> {
    const EPSILON: f64 = 1e-9;
    let mut warnings = Vec::new();
    let config = rules.config();

    let mut ids: Vec<InstructorId> = schedule.instructor_hours().into_keys().collect();
    ids.sort();

    for id in ids {
        let tier = roster
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.tier)
            .unwrap_or_default();
        let cap = config.weekly_cap_for(tier);
        let hours: f64 = schedule
            .assignments_for_instructor(&id)
            .iter()
            .map(|a| a.duration_hours)
            .sum();
        if hours > cap + EPSILON {
            warnings.push(ScheduleWarning::new(
                WarningKind::WeeklyCapExceeded,
                format!("{id} is assigned {hours:.2}h, over the {cap:.1}h weekly cap"),
            ));
        }

        for day in DayOfWeek::ALL {
            let daily = schedule.instructor_hours_on(&id, day);
            if daily > config.daily_cap_hours + EPSILON {
                warnings.push(ScheduleWarning::new(
                    WarningKind::DailyCapExceeded,
                    format!(
                        "{id} is assigned {daily:.2}h on {day}, over the {:.1}h daily cap",
                        config.daily_cap_hours
                    ),
                ));
            }
        }

        let days = schedule.instructor_days(&id).len();
        if days > 7 - config.min_days_off {
            warnings.push(ScheduleWarning::new(
                WarningKind::InsufficientDaysOff,
                format!(
                    "{id} works {days} days, leaving fewer than {} days off",
                    config.min_days_off
                ),
            ));
        }
    }

    warnings
}
