//! Core domain logic for the grade book.
//! This crate owns the grade store: schema, cascade rules, and the weighted
//! overall score.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::grade::{weighted_overall, Grade, GradeEntry, GradeId, GradeScores};
pub use model::period::{Period, PeriodFields, PeriodId};
pub use model::subject::{Subject, SubjectFields, SubjectId};
pub use model::ValidationError;
pub use repo::grade_repo::{GradeRepository, SqliteGradeRepository};
pub use repo::{RepoError, RepoResult};
pub use service::grade_service::GradeService;

/// Minimal health-check API for bridge and CLI smoke checks.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
