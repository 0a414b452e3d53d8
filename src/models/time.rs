//! Weekday, time-of-day, and shift models.
//!
//! The studio week is a fixed seven-day grid; classes start on 15-minute
//! boundaries and never cross midnight, so a time of day is just minutes
//! from midnight. Timezones, dates, and daylight saving are the caller's
//! problem — historic records arrive already normalized to studio time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// All days, Monday first.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Day name (e.g., "Monday").
    pub fn name(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }

    /// Parses a day name, case-insensitively. Accepts full names only.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A class start time: minutes from midnight.
///
/// Sub-minute precision is never needed; aggregation keys round to the
/// minute by construction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Creates a time of day. Minutes beyond 23:59 are clamped.
    pub const fn new(hour: u16, minute: u16) -> Self {
        let total = hour * 60 + minute;
        if total > 23 * 60 + 59 {
            Self(23 * 60 + 59)
        } else {
            Self(total)
        }
    }

    /// Parses "HH:MM" (24-hour).
    pub fn parse(text: &str) -> Option<Self> {
        let (h, m) = text.trim().split_once(':')?;
        let hour: u16 = h.parse().ok()?;
        let minute: u16 = m.parse().ok()?;
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self::new(hour, minute))
    }

    /// Hour component (0-23).
    #[inline]
    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    /// Minute component (0-59).
    #[inline]
    pub fn minute(&self) -> u16 {
        self.0 % 60
    }

    /// Minutes from midnight.
    #[inline]
    pub fn minutes(&self) -> u16 {
        self.0
    }

    /// The shift this start time belongs to.
    ///
    /// Anything before 14:00 counts as morning; everything later is
    /// treated as evening for consolidation and balance heuristics.
    pub fn shift(&self) -> Shift {
        if self.0 < 14 * 60 {
            Shift::Morning
        } else {
            Shift::Evening
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Morning/evening grouping used by the consolidation and balance phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shift {
    Morning,
    Evening,
}

impl Shift {
    /// Both shifts, morning first.
    pub const ALL: [Shift; 2] = [Shift::Morning, Shift::Evening];
}
