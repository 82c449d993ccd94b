//! Grade store use-case service.
//!
//! # Responsibility
//! - Provide the operation set the UI bridge calls (list/add/edit/delete per
//!   entity plus the joined grades-by-period read).
//! - Emit one metadata-only log event per operation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/transaction contracts.
//! - Log lines carry ids and counts only, never subject or teacher names.

use crate::model::grade::{Grade, GradeEntry, GradeId, GradeScores};
use crate::model::period::{Period, PeriodFields, PeriodId};
use crate::model::subject::{Subject, SubjectFields, SubjectId};
use crate::repo::grade_repo::GradeRepository;
use crate::repo::RepoResult;
use log::{debug, info, warn};
use std::time::Instant;

/// The grade store: use-case facade over a [`GradeRepository`].
pub struct GradeService<R: GradeRepository> {
    repo: R,
}

impl<R: GradeRepository> GradeService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_periods(&self) -> RepoResult<Vec<Period>> {
        let periods = observe("list_periods", || self.repo.list_periods())?;
        debug!("event=list_periods module=grade_service count={}", periods.len());
        Ok(periods)
    }

    pub fn list_subjects(&self) -> RepoResult<Vec<Subject>> {
        let subjects = observe("list_subjects", || self.repo.list_subjects())?;
        debug!("event=list_subjects module=grade_service count={}", subjects.len());
        Ok(subjects)
    }

    /// Lists grades of one period joined with their subject.
    ///
    /// An unknown period id yields an empty list.
    pub fn list_grades_for_period(&self, period_id: PeriodId) -> RepoResult<Vec<GradeEntry>> {
        let entries = observe("list_grades_for_period", || {
            self.repo.list_grades_for_period(period_id)
        })?;
        debug!(
            "event=list_grades_for_period module=grade_service period_id={period_id} count={}",
            entries.len()
        );
        Ok(entries)
    }

    pub fn get_grade(&self, grade_id: GradeId) -> RepoResult<Option<Grade>> {
        observe("get_grade", || self.repo.get_grade(grade_id))
    }

    pub fn add_period(&self, quarter: i64, stage: i64) -> RepoResult<PeriodId> {
        let fields = PeriodFields::new(quarter, stage);
        let id = observe("add_period", || self.repo.add_period(&fields))?;
        info!("event=add_period module=grade_service status=ok period_id={id}");
        Ok(id)
    }

    pub fn add_subject(
        &self,
        name: impl Into<String>,
        teacher: Option<String>,
    ) -> RepoResult<SubjectId> {
        let fields = SubjectFields::new(name, teacher);
        let id = observe("add_subject", || self.repo.add_subject(&fields))?;
        info!("event=add_subject module=grade_service status=ok subject_id={id}");
        Ok(id)
    }

    /// Records one grade for a subject in a period.
    ///
    /// `overall` is derived from the scores; it stays empty when either
    /// score is missing.
    pub fn add_grade(
        &self,
        period_id: PeriodId,
        subject_id: SubjectId,
        written: Option<i64>,
        oral: Option<i64>,
        weighting: f64,
    ) -> RepoResult<GradeId> {
        let scores = GradeScores::new(written, oral, weighting);
        let id = observe("add_grade", || {
            self.repo.add_grade(period_id, subject_id, &scores)
        })?;
        info!(
            "event=add_grade module=grade_service status=ok grade_id={id} period_id={period_id} subject_id={subject_id}"
        );
        Ok(id)
    }

    /// Overwrites a period. Returns `false` when no such period exists.
    pub fn edit_period(&self, period_id: PeriodId, quarter: i64, stage: i64) -> RepoResult<bool> {
        let fields = PeriodFields::new(quarter, stage);
        let found = observe("edit_period", || self.repo.edit_period(period_id, &fields))?;
        log_write("edit_period", "period_id", period_id, found);
        Ok(found)
    }

    /// Overwrites a subject. Returns `false` when no such subject exists.
    pub fn edit_subject(
        &self,
        subject_id: SubjectId,
        name: impl Into<String>,
        teacher: Option<String>,
    ) -> RepoResult<bool> {
        let fields = SubjectFields::new(name, teacher);
        let found = observe("edit_subject", || {
            self.repo.edit_subject(subject_id, &fields)
        })?;
        log_write("edit_subject", "subject_id", subject_id, found);
        Ok(found)
    }

    /// Overwrites the scores of a grade and recomputes its overall score.
    pub fn edit_grade(
        &self,
        grade_id: GradeId,
        written: Option<i64>,
        oral: Option<i64>,
        weighting: f64,
    ) -> RepoResult<bool> {
        let scores = GradeScores::new(written, oral, weighting);
        let found = observe("edit_grade", || {
            self.repo.edit_grade(grade_id, &scores, None)
        })?;
        log_write("edit_grade", "grade_id", grade_id, found);
        Ok(found)
    }

    /// Like [`Self::edit_grade`], additionally moving the grade to another
    /// subject within the same period.
    pub fn edit_grade_with_subject(
        &self,
        grade_id: GradeId,
        subject_id: SubjectId,
        written: Option<i64>,
        oral: Option<i64>,
        weighting: f64,
    ) -> RepoResult<bool> {
        let scores = GradeScores::new(written, oral, weighting);
        let found = observe("edit_grade", || {
            self.repo.edit_grade(grade_id, &scores, Some(subject_id))
        })?;
        log_write("edit_grade", "grade_id", grade_id, found);
        Ok(found)
    }

    /// Deletes a period together with every grade recorded in it.
    pub fn delete_period(&self, period_id: PeriodId) -> RepoResult<bool> {
        let found = observe("delete_period", || self.repo.delete_period(period_id))?;
        log_write("delete_period", "period_id", period_id, found);
        Ok(found)
    }

    /// Deletes a subject together with every grade recorded for it.
    pub fn delete_subject(&self, subject_id: SubjectId) -> RepoResult<bool> {
        let found = observe("delete_subject", || self.repo.delete_subject(subject_id))?;
        log_write("delete_subject", "subject_id", subject_id, found);
        Ok(found)
    }

    pub fn delete_grade(&self, grade_id: GradeId) -> RepoResult<bool> {
        let found = observe("delete_grade", || self.repo.delete_grade(grade_id))?;
        log_write("delete_grade", "grade_id", grade_id, found);
        Ok(found)
    }
}

fn observe<T>(event: &'static str, op: impl FnOnce() -> RepoResult<T>) -> RepoResult<T> {
    let started_at = Instant::now();
    let result = op();
    if let Err(err) = &result {
        warn!(
            "event={event} module=grade_service status=error duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        );
    } else {
        debug!(
            "event={event} module=grade_service status=done duration_ms={}",
            started_at.elapsed().as_millis()
        );
    }
    result
}

fn log_write(event: &'static str, id_key: &'static str, id: i64, found: bool) {
    if found {
        info!("event={event} module=grade_service status=ok {id_key}={id}");
    } else {
        info!("event={event} module=grade_service status=noop {id_key}={id} reason=not_found");
    }
}
