//! FFI use-case API for the grade book UI.
//!
//! # Responsibility
//! - Expose one UI-callable function per grade store operation via FRB.
//! - Map core results onto plain response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every call opens its own connection to the resolved database path;
//!   no connection outlives a call.

use gradebook_core::db::open_db;
use gradebook_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    GradeEntry, GradeService, Period, RepoResult, SqliteGradeRepository, Subject,
};
use log::warn;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::OnceLock;

const DB_FILE_NAME: &str = "noten.db";
const DB_PATH_ENV: &str = "GRADEBOOK_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Pins the database file used by every later call.
///
/// Must run before the first store call to take effect. Without it (and
/// without `GRADEBOOK_DB_PATH`) the store falls back to `noten.db` in the OS
/// temp directory, which the OS may clear; hosts should pass a path inside
/// their app data directory.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Calling again with the same path is fine; a different path is refused.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_db_path(path: String) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return "db path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "db path already resolved to `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Period as shown in the period picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodItem {
    pub id: i64,
    pub quarter: i64,
    pub stage: i64,
}

/// Subject as shown in the subject list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectItem {
    pub id: i64,
    pub name: String,
    pub teacher: Option<String>,
}

/// One row of the grades table of a period.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeItem {
    pub id: i64,
    pub subject_id: i64,
    pub subject_name: String,
    pub teacher: Option<String>,
    pub written: Option<i64>,
    pub oral: Option<i64>,
    pub weighting: f64,
    pub overall: Option<f64>,
}

/// Envelope for `list_periods`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodListResponse {
    pub ok: bool,
    pub items: Vec<PeriodItem>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Envelope for `list_subjects`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectListResponse {
    pub ok: bool,
    pub items: Vec<SubjectItem>,
    pub message: String,
}

/// Envelope for `list_grades_for_period`.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeListResponse {
    pub ok: bool,
    pub items: Vec<GradeItem>,
    pub message: String,
}

/// Envelope for add/edit/delete calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResponse {
    pub ok: bool,
    /// Id of the created row, set by add calls only.
    pub id: Option<i64>,
    /// `false` when an edit/delete targeted an id that does not exist.
    pub found: bool,
    pub message: String,
}

impl WriteResponse {
    fn created(message: impl Into<String>, id: i64) -> Self {
        Self {
            ok: true,
            id: Some(id),
            found: true,
            message: message.into(),
        }
    }

    fn applied(entity: &str, action: &str, id: i64, found: bool) -> Self {
        let message = if found {
            format!("{entity} {action}.")
        } else {
            format!("No {} with id {id}; nothing changed.", entity.to_lowercase())
        };
        Self {
            ok: true,
            id: None,
            found,
            message,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            found: false,
            message: message.into(),
        }
    }
}

/// Lists all periods ordered by stage, then quarter.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Stored values are returned as-is, even outside the writable ranges.
#[flutter_rust_bridge::frb(sync)]
pub fn list_periods() -> PeriodListResponse {
    let (ok, items, message) = run_list("list_periods", |service| {
        service
            .list_periods()
            .map(|periods| periods.into_iter().map(to_period_item).collect())
    });
    PeriodListResponse { ok, items, message }
}

/// Lists all subjects ordered by name.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn list_subjects() -> SubjectListResponse {
    let (ok, items, message) = run_list("list_subjects", |service| {
        service
            .list_subjects()
            .map(|subjects| subjects.into_iter().map(to_subject_item).collect())
    });
    SubjectListResponse { ok, items, message }
}

/// Lists the grades of one period, joined with their subject.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Unknown periods yield `ok=true` with an empty list.
#[flutter_rust_bridge::frb(sync)]
pub fn list_grades_for_period(period_id: i64) -> GradeListResponse {
    let (ok, items, message) = run_list("list_grades_for_period", |service| {
        service
            .list_grades_for_period(period_id)
            .map(|entries| entries.into_iter().map(to_grade_item).collect())
    });
    GradeListResponse { ok, items, message }
}

/// Creates a period.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Rejects quarters outside `1..=4` and stages below 1 with `ok=false`.
/// - Returns the created period ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn add_period(quarter: i64, stage: i64) -> WriteResponse {
    match with_grade_service(|service| service.add_period(quarter, stage)) {
        Ok(id) => WriteResponse::created("Period created.", id),
        Err(err) => WriteResponse::failure(format!("add_period failed: {err}")),
    }
}

/// Creates a subject. A blank teacher is stored as absent.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Rejects a blank name with `ok=false`.
/// - Returns the created subject ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn add_subject(name: String, teacher: Option<String>) -> WriteResponse {
    match with_grade_service(|service| service.add_subject(name, teacher)) {
        Ok(id) => WriteResponse::created("Subject created.", id),
        Err(err) => WriteResponse::failure(format!("add_subject failed: {err}")),
    }
}

/// Records a grade. Either score may be omitted; the overall score is then
/// left empty.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Grade and its period/subject link are written together or not at all.
/// - Returns the created grade ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn add_grade(
    period_id: i64,
    subject_id: i64,
    written: Option<i64>,
    oral: Option<i64>,
    weighting: f64,
) -> WriteResponse {
    match with_grade_service(|service| {
        service.add_grade(period_id, subject_id, written, oral, weighting)
    }) {
        Ok(id) => WriteResponse::created("Grade created.", id),
        Err(err) => WriteResponse::failure(format!("add_grade failed: {err}")),
    }
}

/// Overwrites quarter and stage of a period.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - A missing ID yields `ok=true, found=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn edit_period(id: i64, quarter: i64, stage: i64) -> WriteResponse {
    match with_grade_service(|service| service.edit_period(id, quarter, stage)) {
        Ok(found) => WriteResponse::applied("Period", "updated", id, found),
        Err(err) => WriteResponse::failure(format!("edit_period failed: {err}")),
    }
}

/// Overwrites name and teacher of a subject.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - A missing ID yields `ok=true, found=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn edit_subject(id: i64, name: String, teacher: Option<String>) -> WriteResponse {
    match with_grade_service(|service| service.edit_subject(id, name, teacher)) {
        Ok(found) => WriteResponse::applied("Subject", "updated", id, found),
        Err(err) => WriteResponse::failure(format!("edit_subject failed: {err}")),
    }
}

/// Overwrites a grade. With `subject_id` set, the grade also moves to that
/// subject.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - The overall score is recomputed from the new scores.
/// - A missing ID yields `ok=true, found=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn edit_grade(
    id: i64,
    subject_id: Option<i64>,
    written: Option<i64>,
    oral: Option<i64>,
    weighting: f64,
) -> WriteResponse {
    let result = with_grade_service(|service| match subject_id {
        Some(subject_id) => {
            service.edit_grade_with_subject(id, subject_id, written, oral, weighting)
        }
        None => service.edit_grade(id, written, oral, weighting),
    });
    match result {
        Ok(found) => WriteResponse::applied("Grade", "updated", id, found),
        Err(err) => WriteResponse::failure(format!("edit_grade failed: {err}")),
    }
}

/// Deletes a period and every grade recorded in it.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - The cascade runs in one transaction.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_period(id: i64) -> WriteResponse {
    match with_grade_service(|service| service.delete_period(id)) {
        Ok(found) => WriteResponse::applied("Period", "deleted", id, found),
        Err(err) => WriteResponse::failure(format!("delete_period failed: {err}")),
    }
}

/// Deletes a subject and every grade recorded for it.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - The cascade runs in one transaction.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_subject(id: i64) -> WriteResponse {
    match with_grade_service(|service| service.delete_subject(id)) {
        Ok(found) => WriteResponse::applied("Subject", "deleted", id, found),
        Err(err) => WriteResponse::failure(format!("delete_subject failed: {err}")),
    }
}

/// Deletes one grade and its link rows.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - A missing ID yields `ok=true, found=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_grade(id: i64) -> WriteResponse {
    match with_grade_service(|service| service.delete_grade(id)) {
        Ok(found) => WriteResponse::applied("Grade", "deleted", id, found),
        Err(err) => WriteResponse::failure(format!("delete_grade failed: {err}")),
    }
}

fn run_list<T>(
    op: &'static str,
    f: impl FnOnce(&GradeService<SqliteGradeRepository<'_>>) -> RepoResult<Vec<T>>,
) -> (bool, Vec<T>, String) {
    match with_grade_service(f) {
        Ok(items) => {
            let message = if items.is_empty() {
                "No results.".to_string()
            } else {
                format!("Found {} result(s).", items.len())
            };
            (true, items, message)
        }
        Err(err) => (false, Vec::new(), format!("{op} failed: {err}")),
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn with_grade_service<T>(
    f: impl FnOnce(&GradeService<SqliteGradeRepository<'_>>) -> RepoResult<T>,
) -> Result<T, String> {
    let db_path = resolve_db_path();
    let conn: Connection = open_db(&db_path).map_err(|err| {
        warn!("event=ffi_db_open module=ffi status=error error={err}");
        format!("grade DB open failed: {err}")
    })?;
    let repo = SqliteGradeRepository::try_new(&conn)
        .map_err(|err| format!("grade repo init failed: {err}"))?;
    let service = GradeService::new(repo);
    f(&service).map_err(|err| err.to_string())
}

fn to_period_item(period: Period) -> PeriodItem {
    PeriodItem {
        id: period.id,
        quarter: period.quarter,
        stage: period.stage,
    }
}

fn to_subject_item(subject: Subject) -> SubjectItem {
    SubjectItem {
        id: subject.id,
        name: subject.name,
        teacher: subject.teacher,
    }
}

fn to_grade_item(entry: GradeEntry) -> GradeItem {
    GradeItem {
        id: entry.grade_id,
        subject_id: entry.subject_id,
        subject_name: entry.subject_name,
        teacher: entry.teacher,
        written: entry.written,
        oral: entry.oral,
        weighting: entry.weighting,
        overall: entry.overall,
    }
}
