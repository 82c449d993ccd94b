//! Grade book domain model.
//!
//! # Responsibility
//! - Define the records stored for periods, subjects, and grades.
//! - Own input validation and the weighted overall score rule.
//!
//! # Invariants
//! - Ids are SQLite autoincrement keys and never reused by core.
//! - A grade's `overall` is derived, never accepted from callers.

pub mod grade;
pub mod period;
pub mod subject;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input validation failures raised before any SQL runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Quarter must be within `1..=4`.
    QuarterOutOfRange(i64),
    /// Stage (grade level) must be at least 1.
    StageOutOfRange(i64),
    /// Subject name is empty after trim.
    BlankSubjectName,
    /// Weighting must be finite and within `0.0..=1.0`.
    WeightingOutOfRange(f64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuarterOutOfRange(value) => {
                write!(f, "quarter must be between 1 and 4, got {value}")
            }
            Self::StageOutOfRange(value) => write!(f, "stage must be at least 1, got {value}"),
            Self::BlankSubjectName => write!(f, "subject name must not be blank"),
            Self::WeightingOutOfRange(value) => {
                write!(f, "weighting must be between 0 and 1, got {value}")
            }
        }
    }
}

impl Error for ValidationError {}
