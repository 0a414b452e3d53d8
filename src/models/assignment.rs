//! Scheduled class assignment and weekly schedule models.
//!
//! A weekly schedule exclusively owns its assignment list. An assignment
//! belongs to exactly one (day, time, location) cell, but a cell may hold
//! multiple parallel assignments up to the location's capacity. Schedules
//! carry their own warnings: constraint breaches are reported, never
//! silently dropped and never fatal.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{DayOfWeek, InstructorId, Shift, TimeOfDay};

/// A class placed into the weekly timetable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassAssignment {
    /// Assignment identifier, unique within a schedule.
    pub id: String,
    /// Day of week.
    pub day: DayOfWeek,
    /// Start time.
    pub time: TimeOfDay,
    /// Studio location.
    pub location: String,
    /// Class format name.
    pub class_format: String,
    /// Assigned instructor key.
    pub instructor: InstructorId,
    /// Instructor display name.
    pub instructor_name: String,
    /// Duration in fractional hours (0.5, 0.75, or 1.0).
    pub duration_hours: f64,
    /// Expected participant count from historic averages, if known.
    pub expected_participants: Option<f64>,
    /// Expected revenue from historic averages, if known.
    pub expected_revenue: Option<f64>,
    /// Whether this slot came from the top-performer selection.
    pub is_top_performer: bool,
    /// Private sessions are exempt from the restricted midday band.
    pub is_private: bool,
    /// Curated seed classes are never displaced by later phases.
    pub is_locked: bool,
    /// Covering instructor display name, when the regular one is out.
    pub cover_instructor: Option<String>,
}

impl ClassAssignment {
    /// Creates an assignment with a 1-hour duration and no flags set.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        day: DayOfWeek,
        time: TimeOfDay,
        location: impl Into<String>,
        class_format: impl Into<String>,
        instructor: InstructorId,
        instructor_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            day,
            time,
            location: location.into(),
            class_format: class_format.into(),
            instructor,
            instructor_name: instructor_name.into(),
            duration_hours: 1.0,
            expected_participants: None,
            expected_revenue: None,
            is_top_performer: false,
            is_private: false,
            is_locked: false,
            cover_instructor: None,
        }
    }

    /// Sets the duration in hours.
    pub fn with_duration(mut self, hours: f64) -> Self {
        self.duration_hours = hours;
        self
    }

    /// Sets expected participants.
    pub fn with_expected_participants(mut self, participants: f64) -> Self {
        self.expected_participants = Some(participants);
        self
    }

    /// Sets expected revenue.
    pub fn with_expected_revenue(mut self, revenue: f64) -> Self {
        self.expected_revenue = Some(revenue);
        self
    }

    /// Marks this assignment as a historic top performer.
    pub fn top_performer(mut self) -> Self {
        self.is_top_performer = true;
        self
    }

    /// Marks this assignment as a private session.
    pub fn private(mut self) -> Self {
        self.is_private = true;
        self
    }

    /// Marks this assignment as a locked seed class.
    pub fn locked(mut self) -> Self {
        self.is_locked = true;
        self
    }

    /// Sets a covering instructor.
    pub fn with_cover(mut self, name: impl Into<String>) -> Self {
        self.cover_instructor = Some(name.into());
        self
    }

    /// Whether this assignment occupies the given cell.
    pub fn in_cell(&self, day: DayOfWeek, time: TimeOfDay, location: &str) -> bool {
        self.day == day && self.time == time && self.location == location
    }

    /// The shift this assignment falls in.
    pub fn shift(&self) -> Shift {
        self.time.shift()
    }
}

/// A non-fatal schedule diagnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleWarning {
    /// Warning category.
    pub kind: WarningKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of schedule warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// A (location, day, time) cell the optimizer could not fill.
    EmptyCell,
    /// A cell holds more parallel classes than the location allows.
    CapacityExceeded,
    /// An instructor's weekly hours exceed their cap.
    WeeklyCapExceeded,
    /// An instructor's hours on one day exceed the daily cap.
    DailyCapExceeded,
    /// An instructor has fewer than the minimum days off.
    InsufficientDaysOff,
}

impl ScheduleWarning {
    /// Creates a warning.
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// A complete weekly timetable plus diagnostics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeeklySchedule {
    /// All class assignments.
    pub assignments: Vec<ClassAssignment>,
    /// Warnings collected during generation or validation.
    pub warnings: Vec<ScheduleWarning>,
}

impl WeeklySchedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: ClassAssignment) {
        self.assignments.push(assignment);
    }

    /// Adds a warning.
    pub fn add_warning(&mut self, warning: ScheduleWarning) {
        self.warnings.push(warning);
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Assignments occupying the given cell.
    pub fn assignments_in_cell(
        &self,
        day: DayOfWeek,
        time: TimeOfDay,
        location: &str,
    ) -> Vec<&ClassAssignment> {
        self.assignments
            .iter()
            .filter(|a| a.in_cell(day, time, location))
            .collect()
    }

    /// Whether a format already occupies the given cell.
    pub fn format_in_cell(
        &self,
        day: DayOfWeek,
        time: TimeOfDay,
        location: &str,
        format: &str,
    ) -> bool {
        self.assignments
            .iter()
            .any(|a| a.in_cell(day, time, location) && a.class_format == format)
    }

    /// Assignments for a given instructor.
    pub fn assignments_for_instructor(&self, instructor: &InstructorId) -> Vec<&ClassAssignment> {
        self.assignments
            .iter()
            .filter(|a| &a.instructor == instructor)
            .collect()
    }

    /// Whether the instructor already teaches a class at this exact time.
    pub fn instructor_busy_at(
        &self,
        instructor: &InstructorId,
        day: DayOfWeek,
        time: TimeOfDay,
    ) -> bool {
        self.assignments
            .iter()
            .any(|a| &a.instructor == instructor && a.day == day && a.time == time)
    }

    /// Class count at a location on a given day.
    pub fn count_for_day(&self, day: DayOfWeek, location: &str) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.day == day && a.location == location)
            .count()
    }

    /// Weekly occurrence count for a format across all locations.
    pub fn format_week_count(&self, format: &str) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.class_format == format)
            .count()
    }

    /// Total assigned hours per instructor.
    pub fn instructor_hours(&self) -> HashMap<InstructorId, f64> {
        let mut hours: HashMap<InstructorId, f64> = HashMap::new();
        for a in &self.assignments {
            *hours.entry(a.instructor.clone()).or_insert(0.0) += a.duration_hours;
        }
        hours
    }

    /// Hours an instructor teaches on one day.
    pub fn instructor_hours_on(&self, instructor: &InstructorId, day: DayOfWeek) -> f64 {
        self.assignments
            .iter()
            .filter(|a| &a.instructor == instructor && a.day == day)
            .map(|a| a.duration_hours)
            .sum()
    }

    /// Distinct days an instructor works.
    pub fn instructor_days(&self, instructor: &InstructorId) -> Vec<DayOfWeek> {
        let mut days: Vec<DayOfWeek> = self
            .assignments
            .iter()
            .filter(|a| &a.instructor == instructor)
            .map(|a| a.day)
            .collect();
        days.sort();
        days.dedup();
        days
    }

    /// Removes an assignment by id. Returns the removed assignment.
    pub fn remove_assignment(&mut self, id: &str) -> Option<ClassAssignment> {
        let idx = self.assignments.iter().position(|a| a.id == id)?;
        Some(self.assignments.remove(idx))
    }
}
