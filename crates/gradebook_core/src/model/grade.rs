//! Grade (`Note`) records and the weighted overall score.
//!
//! # Invariants
//! - `overall = written * (1 - weighting) + oral * weighting` when both
//!   scores are present, otherwise `None`.
//! - Each grade belongs to exactly one period and one subject through a
//!   `ZeitraumHatNote` link row.

use super::period::PeriodId;
use super::subject::SubjectId;
use super::ValidationError;
use serde::{Deserialize, Serialize};

/// Primary key of a `Note` row.
pub type GradeId = i64;

/// One stored assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub id: GradeId,
    pub written: Option<i64>,
    pub oral: Option<i64>,
    /// Share of the oral score in `overall`, within `0.0..=1.0`.
    pub weighting: f64,
    pub overall: Option<f64>,
}

/// Joined read model returned when listing grades of a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeEntry {
    pub grade_id: GradeId,
    pub period_id: PeriodId,
    pub subject_id: SubjectId,
    pub subject_name: String,
    pub teacher: Option<String>,
    pub written: Option<i64>,
    pub oral: Option<i64>,
    pub weighting: f64,
    pub overall: Option<f64>,
}

/// Caller-supplied part of a grade. `overall` is always derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeScores {
    pub written: Option<i64>,
    pub oral: Option<i64>,
    pub weighting: f64,
}

impl GradeScores {
    pub fn new(written: Option<i64>, oral: Option<i64>, weighting: f64) -> Self {
        Self {
            written,
            oral,
            weighting,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.weighting.is_finite() || !(0.0..=1.0).contains(&self.weighting) {
            return Err(ValidationError::WeightingOutOfRange(self.weighting));
        }
        Ok(())
    }

    pub fn overall(&self) -> Option<f64> {
        weighted_overall(self.written, self.oral, self.weighting)
    }
}

/// Computes the overall score of a grade.
///
/// Returns `None` unless both scores are present.
pub fn weighted_overall(written: Option<i64>, oral: Option<i64>, weighting: f64) -> Option<f64> {
    match (written, oral) {
        (Some(written), Some(oral)) => {
            Some(written as f64 * (1.0 - weighting) + oral as f64 * weighting)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{weighted_overall, GradeScores};
    use crate::model::ValidationError;

    #[test]
    fn overall_uses_weighting_as_oral_share() {
        assert_eq!(weighted_overall(Some(80), Some(60), 0.25), Some(75.0));
        assert_eq!(weighted_overall(Some(10), Some(14), 0.5), Some(12.0));
    }

    #[test]
    fn overall_at_weighting_bounds_picks_one_score() {
        assert_eq!(weighted_overall(Some(9), Some(3), 0.0), Some(9.0));
        assert_eq!(weighted_overall(Some(9), Some(3), 1.0), Some(3.0));
    }

    #[test]
    fn overall_is_none_when_any_score_missing() {
        assert_eq!(weighted_overall(None, Some(60), 0.25), None);
        assert_eq!(weighted_overall(Some(80), None, 0.25), None);
        assert_eq!(weighted_overall(None, None, 0.25), None);
    }

    #[test]
    fn validate_rejects_weighting_outside_unit_interval() {
        for weighting in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            let err = GradeScores::new(Some(1), Some(1), weighting)
                .validate()
                .unwrap_err();
            assert!(matches!(err, ValidationError::WeightingOutOfRange(_)));
        }
    }

    #[test]
    fn validate_accepts_missing_scores() {
        GradeScores::new(None, None, 0.5).validate().unwrap();
    }
}
