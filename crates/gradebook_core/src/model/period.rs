//! Grading period (`Zeitraum`) records.

use super::ValidationError;
use serde::{Deserialize, Serialize};

/// Primary key of a `Zeitraum` row.
pub type PeriodId = i64;

pub const QUARTERS_PER_YEAR: i64 = 4;

/// One grading interval, e.g. stage 11, quarter 2.
///
/// Stored values are read back as-is; range checks apply to writes only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: PeriodId,
    pub quarter: i64,
    /// Grade level the period belongs to.
    pub stage: i64,
}

/// Writable fields of a period, shared by add and edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodFields {
    pub quarter: i64,
    pub stage: i64,
}

impl PeriodFields {
    pub fn new(quarter: i64, stage: i64) -> Self {
        Self { quarter, stage }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=QUARTERS_PER_YEAR).contains(&self.quarter) {
            return Err(ValidationError::QuarterOutOfRange(self.quarter));
        }
        if self.stage < 1 {
            return Err(ValidationError::StageOutOfRange(self.stage));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::PeriodFields;
    use crate::model::ValidationError;

    #[test]
    fn validate_accepts_every_quarter() {
        for quarter in 1..=4 {
            PeriodFields::new(quarter, 11).validate().unwrap();
        }
    }

    #[test]
    fn validate_rejects_quarter_zero_and_five() {
        assert_eq!(
            PeriodFields::new(0, 11).validate(),
            Err(ValidationError::QuarterOutOfRange(0))
        );
        assert_eq!(
            PeriodFields::new(5, 11).validate(),
            Err(ValidationError::QuarterOutOfRange(5))
        );
    }

    #[test]
    fn validate_rejects_stage_below_one() {
        assert_eq!(
            PeriodFields::new(1, 0).validate(),
            Err(ValidationError::StageOutOfRange(0))
        );
        assert_eq!(
            PeriodFields::new(1, -3).validate(),
            Err(ValidationError::StageOutOfRange(-3))
        );
    }

    #[test]
    fn validate_accepts_stage_beyond_small_int_range() {
        PeriodFields::new(2, 2024).validate().unwrap();
    }
}
