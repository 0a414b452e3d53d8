//! Input validation for scheduling data.
//!
//! Checks structural integrity of historic records and the instructor
//! roster before optimization. Detects:
//! - Duplicate roster entries
//! - Blank names, formats, or locations
//! - Impossible record figures (negative or non-finite revenue,
//!   check-ins above the participant count)

use crate::models::{HistoricClassRecord, Instructor};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two roster entries normalize to the same instructor key.
    DuplicateInstructor,
    /// A required name field is empty.
    BlankField,
    /// A numeric field holds an impossible value.
    InvalidFigure,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates historic records and the roster for an optimization run.
///
/// Checks:
/// 1. No two roster entries share a normalized instructor key
/// 2. Roster names are non-blank
/// 3. Every record carries a format, location, and instructor name
/// 4. Record revenue is finite and non-negative
/// 5. Check-ins never exceed the participant count
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    records: &[HistoricClassRecord],
    roster: &[Instructor],
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut ids = HashSet::new();
    for instructor in roster {
        if instructor.first_name.trim().is_empty() && instructor.last_name.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::BlankField,
                "Roster entry with an empty name",
            ));
            continue;
        }
        if !ids.insert(instructor.id.clone()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateInstructor,
                format!("Duplicate roster entry: {}", instructor.id),
            ));
        }
    }

    for (idx, record) in records.iter().enumerate() {
        if record.class_format.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::BlankField,
                format!("Record {idx} has an empty class format"),
            ));
        }
        if record.location.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::BlankField,
                format!("Record {idx} has an empty location"),
            ));
        }
        if record.instructor.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::BlankField,
                format!("Record {idx} has an empty instructor name"),
            ));
        }
        if !record.revenue.is_finite() || record.revenue < 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidFigure,
                format!("Record {idx} has invalid revenue {}", record.revenue),
            ));
        }
        if record.checked_in > record.participants {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidFigure,
                format!(
                    "Record {idx} has {} check-ins but only {} participants",
                    record.checked_in, record.participants
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
