//! Historic class record model.
//!
//! One record per historic session, as ingested from the booking system's
//! CSV export (ingestion and validation happen upstream). Records are the
//! source of truth for every statistic and are never mutated.

use serde::{Deserialize, Serialize};

use super::{DayOfWeek, TimeOfDay};

/// A single historic class session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricClassRecord {
    /// Class format name (e.g., "Studio Barre 57").
    pub class_format: String,
    /// Studio location name.
    pub location: String,
    /// Day of week the session ran.
    pub day: DayOfWeek,
    /// Session start time.
    pub time: TimeOfDay,
    /// Instructor display name ("First Last").
    pub instructor: String,
    /// Booked participant count.
    pub participants: u32,
    /// Total revenue for the session.
    pub revenue: f64,
    /// Participants who actually checked in.
    pub checked_in: u32,
    /// Complimentary attendees.
    pub comps: u32,
    /// Late cancellations.
    pub late_cancellations: u32,
}

impl HistoricClassRecord {
    /// Creates a record with zero counts.
    pub fn new(
        class_format: impl Into<String>,
        location: impl Into<String>,
        day: DayOfWeek,
        time: TimeOfDay,
        instructor: impl Into<String>,
    ) -> Self {
        Self {
            class_format: class_format.into(),
            location: location.into(),
            day,
            time,
            instructor: instructor.into(),
            participants: 0,
            revenue: 0.0,
            checked_in: 0,
            comps: 0,
            late_cancellations: 0,
        }
    }

    /// Sets the participant count.
    pub fn with_participants(mut self, participants: u32) -> Self {
        self.participants = participants;
        self
    }

    /// Sets the session revenue.
    pub fn with_revenue(mut self, revenue: f64) -> Self {
        self.revenue = revenue;
        self
    }

    /// Sets the check-in count.
    pub fn with_checked_in(mut self, checked_in: u32) -> Self {
        self.checked_in = checked_in;
        self
    }

    /// Sets the comp count.
    pub fn with_comps(mut self, comps: u32) -> Self {
        self.comps = comps;
        self
    }

    /// Sets the late cancellation count.
    pub fn with_late_cancellations(mut self, late_cancellations: u32) -> Self {
        self.late_cancellations = late_cancellations;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let r = HistoricClassRecord::new(
            "Studio Barre 57",
            "Kwality House",
            DayOfWeek::Saturday,
            TimeOfDay::new(10, 15),
            "Anita Rao",
        )
        .with_participants(24)
        .with_revenue(18_500.0)
        .with_checked_in(22)
        .with_comps(1)
        .with_late_cancellations(2);

        assert_eq!(r.class_format, "Studio Barre 57");
        assert_eq!(r.location, "Kwality House");
        assert_eq!(r.day, DayOfWeek::Saturday);
        assert_eq!(r.time.to_string(), "10:15");
        assert_eq!(r.participants, 24);
        assert!((r.revenue - 18_500.0).abs() < 1e-10);
        assert_eq!(r.checked_in, 22);
    }

    #[test]
    fn test_record_serde_round_trip() {
        let r = HistoricClassRecord::new(
            "Studio FIT",
            "Kenkere House",
            DayOfWeek::Monday,
            TimeOfDay::new(18, 0),
            "Vikram Shetty",
        )
        .with_participants(12);

        let json = serde_json::to_string(&r).unwrap();
        let back: HistoricClassRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.class_format, r.class_format);
        assert_eq!(back.day, r.day);
        assert_eq!(back.time, r.time);
        assert_eq!(back.participants, 12);
    }
}
