//! Scheduling domain models.
//!
//! Core data types for the weekly timetable problem: historic session
//! records, the instructor roster, and the schedule being built.
//!
//! | Type | Role |
//! |------|------|
//! | `HistoricClassRecord` | Immutable past session, source of all statistics |
//! | `Instructor` | Rostered instructor with tier and availability |
//! | `ClassAssignment` | One class placed into a (day, time, location) cell |
//! | `WeeklySchedule` | The full timetable plus warnings |

mod assignment;
mod instructor;
mod record;
mod time;

pub use assignment::{ClassAssignment, ScheduleWarning, WarningKind, WeeklySchedule};
pub use instructor::{Instructor, InstructorId, InstructorTier};
pub use record::HistoricClassRecord;
pub use time::{DayOfWeek, Shift, TimeOfDay};
