//! Instructor load tracking.
//!
//! A mutable accumulator scoped to a single optimization run. The
//! scheduler asks `can_assign` before every candidate commit; `commit`
//! then updates all counters and never fails. `release` reverses a
//! commit so the plan/commit reassignment passes can roll back.
//!
//! Not thread-safe: single writer, one phase at a time. Each run builds
//! its own tracker from scratch; nothing survives across runs, and
//! concurrent optimization strategies must each own an instance.

use std::collections::HashMap;
use thiserror::Error;

use crate::models::{DayOfWeek, Instructor, InstructorId, InstructorTier, Shift, TimeOfDay};
use crate::rules::Rules;

/// Tolerance for fractional-hour comparisons.
const HOURS_EPSILON: f64 = 1e-9;

/// Why a candidate assignment was rejected.
///
/// A typed rejection, not a failure: the scheduler consumes these to try
/// the next candidate, and manual callers surface them as validation
/// errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssignmentRejection {
    /// The weekly hour cap would be breached.
    #[error("{instructor} would exceed the weekly limit of {cap:.1}h ({assigned:.1}h already assigned)")]
    WeeklyCapExceeded {
        instructor: InstructorId,
        cap: f64,
        assigned: f64,
    },
    /// The daily hour cap would be breached.
    #[error("{instructor} would exceed the daily limit of {cap:.1}h on {day}")]
    DailyCapExceeded {
        instructor: InstructorId,
        cap: f64,
        day: DayOfWeek,
    },
    /// The assignment would create a working day past the days-off floor.
    #[error("{instructor} already works {days} days; at least {min_off} days off are required")]
    TooManyWorkingDays {
        instructor: InstructorId,
        days: usize,
        min_off: usize,
    },
    /// The instructor already teaches at another location that day.
    #[error("{instructor} is already assigned to {assigned} on {day}")]
    LocationConflict {
        instructor: InstructorId,
        assigned: String,
        day: DayOfWeek,
    },
    /// The instructor's tier may not teach this format.
    #[error("{instructor} ({tier:?} tier) is not eligible to teach {format}")]
    TierIneligible {
        instructor: InstructorId,
        tier: InstructorTier,
        format: String,
    },
    /// The instructor is not available on this day.
    #[error("{instructor} is not available on {day}")]
    UnavailableDay {
        instructor: InstructorId,
        day: DayOfWeek,
    },
}

#[derive(Debug, Clone)]
struct RosterEntry {
    tier: InstructorTier,
    available_days: Option<Vec<DayOfWeek>>,
}

/// Per-run instructor hour and shift accounting.
#[derive(Debug, Clone)]
pub struct InstructorLoadTracker {
    rules: Rules,
    roster: HashMap<InstructorId, RosterEntry>,
    weekly_hours: HashMap<InstructorId, f64>,
    daily_hours: HashMap<(InstructorId, DayOfWeek), f64>,
    daily_count: HashMap<(InstructorId, DayOfWeek), u32>,
    shift_count: HashMap<(InstructorId, DayOfWeek, Shift), u32>,
    day_location: HashMap<(InstructorId, DayOfWeek), String>,
}

impl InstructorLoadTracker {
    /// Creates an empty tracker for the given roster.
    pub fn new(roster: &[Instructor], rules: Rules) -> Self {
        let roster = roster
            .iter()
            .map(|i| {
                (
                    i.id.clone(),
                    RosterEntry {
                        tier: i.tier,
                        available_days: i.available_days.clone(),
                    },
                )
            })
            .collect();
        Self {
            rules,
            roster,
            weekly_hours: HashMap::new(),
            daily_hours: HashMap::new(),
            daily_count: HashMap::new(),
            shift_count: HashMap::new(),
            day_location: HashMap::new(),
        }
    }

    /// Tier for an instructor (standard if not rostered).
    pub fn tier(&self, instructor: &InstructorId) -> InstructorTier {
        self.roster
            .get(instructor)
            .map(|e| e.tier)
            .unwrap_or_default()
    }

    /// Weekly cap for an instructor's tier.
    pub fn weekly_cap(&self, instructor: &InstructorId) -> f64 {
        self.rules.config().weekly_cap_for(self.tier(instructor))
    }

    /// Hours assigned this week.
    pub fn weekly_hours(&self, instructor: &InstructorId) -> f64 {
        self.weekly_hours.get(instructor).copied().unwrap_or(0.0)
    }

    /// Hours assigned on one day.
    pub fn daily_hours(&self, instructor: &InstructorId, day: DayOfWeek) -> f64 {
        self.daily_hours
            .get(&(instructor.clone(), day))
            .copied()
            .unwrap_or(0.0)
    }

    /// Distinct days with at least one assignment.
    pub fn working_days(&self, instructor: &InstructorId) -> usize {
        self.daily_count
            .iter()
            .filter(|((id, _), count)| id == instructor && **count > 0)
            .count()
    }

    /// Remaining weekly budget (never negative).
    pub fn remaining_weekly(&self, instructor: &InstructorId) -> f64 {
        (self.weekly_cap(instructor) - self.weekly_hours(instructor)).max(0.0)
    }

    /// Location assigned on a given day, if any.
    pub fn location_on(&self, instructor: &InstructorId, day: DayOfWeek) -> Option<&str> {
        self.day_location
            .get(&(instructor.clone(), day))
            .map(String::as_str)
    }

    /// Whether the instructor already teaches in a shift that day.
    pub fn occupies_shift(&self, instructor: &InstructorId, day: DayOfWeek, shift: Shift) -> bool {
        self.shift_count
            .get(&(instructor.clone(), day, shift))
            .copied()
            .unwrap_or(0)
            > 0
    }

    /// Checks whether an assignment would satisfy all hard constraints.
    ///
    /// Check order matters: the days-off rule rejects a sixth working day
    /// before any hour budget is consulted, so an instructor with spare
    /// hours still cannot pick up an extra day.
    pub fn can_assign(
        &self,
        instructor: &InstructorId,
        day: DayOfWeek,
        location: &str,
        duration_hours: f64,
        format: &str,
    ) -> Result<(), AssignmentRejection> {
        let entry = self.roster.get(instructor);

        if let Some(days) = entry.and_then(|e| e.available_days.as_ref()) {
            if !days.contains(&day) {
                return Err(AssignmentRejection::UnavailableDay {
                    instructor: instructor.clone(),
                    day,
                });
            }
        }

        // Days-off floor, checked before any hour cap.
        let works_today = self.daily_hours(instructor, day) > 0.0;
        let days = self.working_days(instructor);
        let max_days = 7 - self.rules.config().min_days_off;
        if !works_today && days >= max_days {
            return Err(AssignmentRejection::TooManyWorkingDays {
                instructor: instructor.clone(),
                days,
                min_off: self.rules.config().min_days_off,
            });
        }

        if let Some(assigned) = self.location_on(instructor, day) {
            if !assigned.eq_ignore_ascii_case(location) {
                return Err(AssignmentRejection::LocationConflict {
                    instructor: instructor.clone(),
                    assigned: assigned.to_string(),
                    day,
                });
            }
        }

        let tier = self.tier(instructor);
        if !self.rules.tier_eligible(tier, format) {
            return Err(AssignmentRejection::TierIneligible {
                instructor: instructor.clone(),
                tier,
                format: format.to_string(),
            });
        }

        let daily_cap = self.rules.config().daily_cap_hours;
        if self.daily_hours(instructor, day) + duration_hours > daily_cap + HOURS_EPSILON {
            return Err(AssignmentRejection::DailyCapExceeded {
                instructor: instructor.clone(),
                cap: daily_cap,
                day,
            });
        }

        let weekly_cap = self.weekly_cap(instructor);
        let assigned = self.weekly_hours(instructor);
        if assigned + duration_hours > weekly_cap + HOURS_EPSILON {
            return Err(AssignmentRejection::WeeklyCapExceeded {
                instructor: instructor.clone(),
                cap: weekly_cap,
                assigned,
            });
        }

        Ok(())
    }

    /// Records a committed assignment. The caller must have checked
    /// `can_assign` first; `commit` itself never fails.
    pub fn commit(
        &mut self,
        instructor: &InstructorId,
        day: DayOfWeek,
        time: TimeOfDay,
        location: &str,
        duration_hours: f64,
    ) {
        *self.weekly_hours.entry(instructor.clone()).or_insert(0.0) += duration_hours;
        *self
            .daily_hours
            .entry((instructor.clone(), day))
            .or_insert(0.0) += duration_hours;
        *self
            .daily_count
            .entry((instructor.clone(), day))
            .or_insert(0) += 1;
        *self
            .shift_count
            .entry((instructor.clone(), day, time.shift()))
            .or_insert(0) += 1;
        self.day_location
            .entry((instructor.clone(), day))
            .or_insert_with(|| location.to_string());
    }

    /// Reverses a previous commit (used when a planned reassignment
    /// releases an assignment from its original instructor).
    pub fn release(
        &mut self,
        instructor: &InstructorId,
        day: DayOfWeek,
        time: TimeOfDay,
        duration_hours: f64,
    ) {
        if let Some(hours) = self.weekly_hours.get_mut(instructor) {
            *hours = (*hours - duration_hours).max(0.0);
        }
        let day_key = (instructor.clone(), day);
        if let Some(hours) = self.daily_hours.get_mut(&day_key) {
            *hours = (*hours - duration_hours).max(0.0);
        }
        let mut day_cleared = false;
        if let Some(count) = self.daily_count.get_mut(&day_key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                day_cleared = true;
            }
        }
        if day_cleared {
            self.daily_count.remove(&day_key);
            self.daily_hours.remove(&day_key);
            self.day_location.remove(&day_key);
        }
        let shift_key = (instructor.clone(), day, time.shift());
        if let Some(count) = self.shift_count.get_mut(&shift_key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.shift_count.remove(&shift_key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScheduleConfig;
    use crate::models::Instructor;

    fn tracker() -> (InstructorLoadTracker, InstructorId, InstructorId) {
        let roster = vec![
            Instructor::new("Anita", "Rao").with_tier(InstructorTier::Senior),
            Instructor::new("Tara", "Bose").with_tier(InstructorTier::New),
        ];
        let anita = roster[0].id.clone();
        let tara = roster[1].id.clone();
        let t = InstructorLoadTracker::new(&roster, Rules::new(ScheduleConfig::default()));
        (t, anita, tara)
    }

    #[test]
    fn test_commit_accumulates_hours() {
        let (mut t, anita, _) = tracker();
        t.commit(
            &anita,
            DayOfWeek::Monday,
            TimeOfDay::new(9, 0),
            "Kwality House",
            1.0,
        );
        t.commit(
            &anita,
            DayOfWeek::Monday,
            TimeOfDay::new(10, 0),
            "Kwality House",
            0.75,
        );
        assert!((t.weekly_hours(&anita) - 1.75).abs() < 1e-10);
        assert!((t.daily_hours(&anita, DayOfWeek::Monday) - 1.75).abs() < 1e-10);
        assert_eq!(t.working_days(&anita), 1);
        assert_eq!(t.location_on(&anita, DayOfWeek::Monday), Some("Kwality House"));
        assert!(t.occupies_shift(&anita, DayOfWeek::Monday, Shift::Morning));
        assert!(!t.occupies_shift(&anita, DayOfWeek::Monday, Shift::Evening));
    }

    #[test]
    fn test_daily_cap() {
        let (mut t, anita, _) = tracker();
        for hour in [7u16, 9, 10, 11] {
            t.commit(
                &anita,
                DayOfWeek::Monday,
                TimeOfDay::new(hour, 0),
                "Kwality House",
                1.0,
            );
        }
        let result = t.can_assign(&anita, DayOfWeek::Monday, "Kwality House", 1.0, "Studio FIT");
        assert!(matches!(
            result,
            Err(AssignmentRejection::DailyCapExceeded { .. })
        ));
        // A different day is fine
        assert!(t
            .can_assign(&anita, DayOfWeek::Tuesday, "Kwality House", 1.0, "Studio FIT")
            .is_ok());
    }

    #[test]
    fn test_weekly_cap_by_tier() {
        let (mut t, _, tara) = tracker();
        // New tier: 10h cap. Fill 4 + 4 + 2 across three days.
        for (day, hours) in [
            (DayOfWeek::Monday, 4.0),
            (DayOfWeek::Tuesday, 4.0),
            (DayOfWeek::Wednesday, 2.0),
        ] {
            t.commit(&tara, day, TimeOfDay::new(9, 0), "Kwality House", hours);
        }
        let result = t.can_assign(
            &tara,
            DayOfWeek::Thursday,
            "Kwality House",
            0.5,
            "Studio Mat 57",
        );
        assert!(matches!(
            result,
            Err(AssignmentRejection::WeeklyCapExceeded { .. })
        ));
    }

    #[test]
    fn test_days_off_floor_beats_hour_budget() {
        let (mut t, anita, _) = tracker();
        // Five working days at one hour each: plenty of weekly budget left.
        for day in [
            DayOfWeek::Monday,
            DayOfWeek::Tuesday,
            DayOfWeek::Wednesday,
            DayOfWeek::Thursday,
            DayOfWeek::Friday,
        ] {
            t.commit(&anita, day, TimeOfDay::new(9, 0), "Kwality House", 1.0);
        }
        let result = t.can_assign(
            &anita,
            DayOfWeek::Saturday,
            "Kwality House",
            1.0,
            "Studio Barre 57",
        );
        assert!(matches!(
            result,
            Err(AssignmentRejection::TooManyWorkingDays { .. })
        ));
        // An existing working day is still allowed
        assert!(t
            .can_assign(
                &anita,
                DayOfWeek::Friday,
                "Kwality House",
                1.0,
                "Studio Barre 57"
            )
            .is_ok());
    }

    #[test]
    fn test_one_location_per_day() {
        let (mut t, anita, _) = tracker();
        t.commit(
            &anita,
            DayOfWeek::Monday,
            TimeOfDay::new(9, 0),
            "Kwality House",
            1.0,
        );
        let result = t.can_assign(
            &anita,
            DayOfWeek::Monday,
            "Kenkere House",
            1.0,
            "Studio FIT",
        );
        assert!(matches!(
            result,
            Err(AssignmentRejection::LocationConflict { .. })
        ));
        assert!(t
            .can_assign(&anita, DayOfWeek::Monday, "Kwality House", 1.0, "Studio FIT")
            .is_ok());
    }

    #[test]
    fn test_tier_eligibility_checked() {
        let (t, _, tara) = tracker();
        let result = t.can_assign(&tara, DayOfWeek::Monday, "Kwality House", 1.0, "Studio HIIT");
        assert!(matches!(
            result,
            Err(AssignmentRejection::TierIneligible { .. })
        ));
    }

    #[test]
    fn test_availability_respected() {
        let roster = vec![Instructor::new("Meera", "Iyer")
            .with_available_days(vec![DayOfWeek::Monday, DayOfWeek::Wednesday])];
        let meera = roster[0].id.clone();
        let t = InstructorLoadTracker::new(&roster, Rules::new(ScheduleConfig::default()));
        assert!(t
            .can_assign(&meera, DayOfWeek::Monday, "Kwality House", 1.0, "Studio FIT")
            .is_ok());
        assert!(matches!(
            t.can_assign(&meera, DayOfWeek::Friday, "Kwality House", 1.0, "Studio FIT"),
            Err(AssignmentRejection::UnavailableDay { .. })
        ));
    }

    #[test]
    fn test_release_reverses_commit() {
        let (mut t, anita, _) = tracker();
        t.commit(
            &anita,
            DayOfWeek::Monday,
            TimeOfDay::new(9, 0),
            "Kwality House",
            1.0,
        );
        t.release(&anita, DayOfWeek::Monday, TimeOfDay::new(9, 0), 1.0);

        assert!((t.weekly_hours(&anita) - 0.0).abs() < 1e-10);
        assert_eq!(t.working_days(&anita), 0);
        assert_eq!(t.location_on(&anita, DayOfWeek::Monday), None);
        assert!(!t.occupies_shift(&anita, DayOfWeek::Monday, Shift::Morning));
        // Day slot freed: another location is allowed again
        assert!(t
            .can_assign(&anita, DayOfWeek::Monday, "Kenkere House", 1.0, "Studio FIT")
            .is_ok());
    }

    #[test]
    fn test_fractional_hours_no_drift() {
        let (mut t, anita, _) = tracker();
        // 0.75 * 4 = 3.0, still under the 4h daily cap
        for hour in [7u16, 8, 9, 10] {
            t.commit(
                &anita,
                DayOfWeek::Monday,
                TimeOfDay::new(hour, 0),
                "Kwality House",
                0.75,
            );
        }
        assert!(t
            .can_assign(
                &anita,
                DayOfWeek::Monday,
                "Kwality House",
                1.0,
                "Studio Barre 57"
            )
            .is_ok());
        assert!(t
            .can_assign(
                &anita,
                DayOfWeek::Monday,
                "Kwality House",
                1.5,
                "Studio Barre 57"
            )
            .is_err());
    }
}
