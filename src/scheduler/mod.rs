//! Weekly schedule generation.
//!
//! [`ScheduleOptimizer`] turns historic class records and an instructor
//! roster into a full weekly timetable through a sequence of greedy
//! phases; [`validate_assignment`] and [`compute_instructor_hours`]
//! support manual edits against a generated schedule.

mod manual;
mod optimizer;

pub use manual::{
    audit_instructor_hours, compute_instructor_hours, validate_assignment, ValidationOutcome,
};
pub use optimizer::{OptimizationGoal, OptimizerOptions, ScheduleOptimizer};
