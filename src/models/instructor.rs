//! Instructor roster model.
//!
//! Instructor identity is a normalized key, not a display-name string:
//! historic exports drift in casing and spacing ("Anita  Rao" vs
//! "anita rao"), and hour accounting must not split one person across
//! two keys. The display name is carried separately.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::DayOfWeek;

/// Stable instructor identifier.
///
/// Built by lowercasing and whitespace-collapsing a display name, so any
/// formatting variant of the same name maps to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstructorId(String);

impl InstructorId {
    /// Normalizes a display name into a stable key.
    pub fn from_name(name: &str) -> Self {
        let key = name
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        Self(key)
    }

    /// The normalized key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstructorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Instructor classification governing format eligibility and hour caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InstructorTier {
    /// Senior/priority tier: eligible for advanced formats, preferred at
    /// peak hours.
    Senior,
    /// New tier: limited format allow-list and a reduced weekly cap.
    New,
    /// Everyone else.
    #[default]
    Standard,
}

/// A rostered instructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instructor {
    /// Stable identity key.
    pub id: InstructorId,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Tier classification.
    pub tier: InstructorTier,
    /// Preferred formats, best first. Optional hint; historic stats win.
    pub specialties: Vec<String>,
    /// Days the instructor can work. `None` = all days.
    pub available_days: Option<Vec<DayOfWeek>>,
}

impl Instructor {
    /// Creates a standard-tier instructor.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        let first_name = first_name.into();
        let last_name = last_name.into();
        let id = InstructorId::from_name(&format!("{first_name} {last_name}"));
        Self {
            id,
            first_name,
            last_name,
            tier: InstructorTier::Standard,
            specialties: Vec::new(),
            available_days: None,
        }
    }

    /// Sets the tier.
    pub fn with_tier(mut self, tier: InstructorTier) -> Self {
        self.tier = tier;
        self
    }

    /// Adds a specialty format.
    pub fn with_specialty(mut self, format: impl Into<String>) -> Self {
        self.specialties.push(format.into());
        self
    }

    /// Restricts availability to the given days.
    pub fn with_available_days(mut self, days: Vec<DayOfWeek>) -> Self {
        self.available_days = Some(days);
        self
    }

    /// Display name ("First Last").
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether the instructor can work on the given day.
    pub fn is_available_on(&self, day: DayOfWeek) -> bool {
        match &self.available_days {
            None => true,
            Some(days) => days.contains(&day),
        }
    }
}
