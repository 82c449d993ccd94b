//! Grade repository contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `Zeitraum`, `Fach`, `Note` and the `ZeitraumHatNote` links.
//! - Cascade deletes from periods and subjects down to their grades.
//!
//! # Invariants
//! - A grade row and its link row are inserted in the same transaction.
//! - Deleting a period or subject removes its link rows and every grade no
//!   remaining link reaches, then the owner row, in one transaction.
//! - `Note.insgesamt` is always recomputed from the scores being written.

use super::{ensure_grade_connection_ready, RepoResult};
use crate::model::grade::{Grade, GradeEntry, GradeId, GradeScores};
use crate::model::period::{Period, PeriodFields, PeriodId};
use crate::model::subject::{Subject, SubjectFields, SubjectId};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const GRADE_ENTRY_SELECT_SQL: &str = "SELECT
    n.id AS grade_id,
    l.zeitraum_id AS period_id,
    f.id AS subject_id,
    f.name AS subject_name,
    f.lehrer AS teacher,
    n.schriftlich AS written,
    n.muendlich AS oral,
    n.gewichtung AS weighting,
    n.insgesamt AS overall
FROM ZeitraumHatNote l
INNER JOIN Note n ON n.id = l.note_id
INNER JOIN Fach f ON f.id = l.fach_id";

/// Which side of the link table owns a cascade delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkOwner {
    Period,
    Subject,
}

impl LinkOwner {
    fn link_column(self) -> &'static str {
        match self {
            Self::Period => "zeitraum_id",
            Self::Subject => "fach_id",
        }
    }

    fn owner_table(self) -> &'static str {
        match self {
            Self::Period => "Zeitraum",
            Self::Subject => "Fach",
        }
    }
}

/// Repository interface for the grade store.
pub trait GradeRepository {
    /// Lists all periods ordered by stage, then quarter.
    fn list_periods(&self) -> RepoResult<Vec<Period>>;
    /// Lists all subjects ordered by name.
    fn list_subjects(&self) -> RepoResult<Vec<Subject>>;
    /// Lists grades linked to one period, joined with their subject.
    fn list_grades_for_period(&self, period_id: PeriodId) -> RepoResult<Vec<GradeEntry>>;
    /// Loads one grade row by id.
    fn get_grade(&self, grade_id: GradeId) -> RepoResult<Option<Grade>>;
    fn add_period(&self, fields: &PeriodFields) -> RepoResult<PeriodId>;
    fn add_subject(&self, fields: &SubjectFields) -> RepoResult<SubjectId>;
    /// Inserts one grade and its link to `period_id` and `subject_id`.
    fn add_grade(
        &self,
        period_id: PeriodId,
        subject_id: SubjectId,
        scores: &GradeScores,
    ) -> RepoResult<GradeId>;
    fn edit_period(&self, period_id: PeriodId, fields: &PeriodFields) -> RepoResult<bool>;
    fn edit_subject(&self, subject_id: SubjectId, fields: &SubjectFields) -> RepoResult<bool>;
    /// Overwrites scores and, when `subject_id` is set, moves the grade's link.
    fn edit_grade(
        &self,
        grade_id: GradeId,
        scores: &GradeScores,
        subject_id: Option<SubjectId>,
    ) -> RepoResult<bool>;
    fn delete_period(&self, period_id: PeriodId) -> RepoResult<bool>;
    fn delete_subject(&self, subject_id: SubjectId) -> RepoResult<bool>;
    /// Deletes one grade and the link rows referencing it.
    fn delete_grade(&self, grade_id: GradeId) -> RepoResult<bool>;
}

/// SQLite-backed grade repository over a borrowed connection.
pub struct SqliteGradeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGradeRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_grade_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl GradeRepository for SqliteGradeRepository<'_> {
    fn list_periods(&self) -> RepoResult<Vec<Period>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, quartal, stufe
             FROM Zeitraum
             ORDER BY stufe ASC, quartal ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut periods = Vec::new();
        while let Some(row) = rows.next()? {
            periods.push(parse_period_row(row)?);
        }
        Ok(periods)
    }

    fn list_subjects(&self) -> RepoResult<Vec<Subject>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, lehrer
             FROM Fach
             ORDER BY name COLLATE NOCASE ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut subjects = Vec::new();
        while let Some(row) = rows.next()? {
            subjects.push(Subject {
                id: row.get("id")?,
                name: row.get("name")?,
                teacher: row.get("lehrer")?,
            });
        }
        Ok(subjects)
    }

    fn list_grades_for_period(&self, period_id: PeriodId) -> RepoResult<Vec<GradeEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GRADE_ENTRY_SELECT_SQL}
             WHERE l.zeitraum_id = ?1
             ORDER BY f.name COLLATE NOCASE ASC, n.id ASC;"
        ))?;
        let mut rows = stmt.query([period_id])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_grade_entry_row(row)?);
        }
        Ok(entries)
    }

    fn get_grade(&self, grade_id: GradeId) -> RepoResult<Option<Grade>> {
        let grade = self
            .conn
            .query_row(
                "SELECT id, schriftlich, muendlich, gewichtung, insgesamt
                 FROM Note
                 WHERE id = ?1;",
                [grade_id],
                |row| {
                    Ok(Grade {
                        id: row.get("id")?,
                        written: row.get("schriftlich")?,
                        oral: row.get("muendlich")?,
                        weighting: row.get("gewichtung")?,
                        overall: row.get("insgesamt")?,
                    })
                },
            )
            .optional()?;
        Ok(grade)
    }

    fn add_period(&self, fields: &PeriodFields) -> RepoResult<PeriodId> {
        fields.validate()?;

        self.conn.execute(
            "INSERT INTO Zeitraum (quartal, stufe) VALUES (?1, ?2);",
            params![fields.quarter, fields.stage],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn add_subject(&self, fields: &SubjectFields) -> RepoResult<SubjectId> {
        let fields = fields.normalized()?;

        self.conn.execute(
            "INSERT INTO Fach (name, lehrer) VALUES (?1, ?2);",
            params![fields.name.as_str(), fields.teacher.as_deref()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn add_grade(
        &self,
        period_id: PeriodId,
        subject_id: SubjectId,
        scores: &GradeScores,
    ) -> RepoResult<GradeId> {
        scores.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO Note (schriftlich, muendlich, gewichtung, insgesamt)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                scores.written,
                scores.oral,
                scores.weighting,
                scores.overall()
            ],
        )?;
        let grade_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO ZeitraumHatNote (zeitraum_id, fach_id, note_id)
             VALUES (?1, ?2, ?3);",
            params![period_id, subject_id, grade_id],
        )?;

        tx.commit()?;
        Ok(grade_id)
    }

    fn edit_period(&self, period_id: PeriodId, fields: &PeriodFields) -> RepoResult<bool> {
        fields.validate()?;

        let changed = self.conn.execute(
            "UPDATE Zeitraum SET quartal = ?1, stufe = ?2 WHERE id = ?3;",
            params![fields.quarter, fields.stage, period_id],
        )?;
        Ok(changed > 0)
    }

    fn edit_subject(&self, subject_id: SubjectId, fields: &SubjectFields) -> RepoResult<bool> {
        let fields = fields.normalized()?;

        let changed = self.conn.execute(
            "UPDATE Fach SET name = ?1, lehrer = ?2 WHERE id = ?3;",
            params![fields.name.as_str(), fields.teacher.as_deref(), subject_id],
        )?;
        Ok(changed > 0)
    }

    fn edit_grade(
        &self,
        grade_id: GradeId,
        scores: &GradeScores,
        subject_id: Option<SubjectId>,
    ) -> RepoResult<bool> {
        scores.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE Note
             SET schriftlich = ?1,
                 muendlich = ?2,
                 gewichtung = ?3,
                 insgesamt = ?4
             WHERE id = ?5;",
            params![
                scores.written,
                scores.oral,
                scores.weighting,
                scores.overall(),
                grade_id
            ],
        )?;
        if changed == 0 {
            return Ok(false);
        }

        if let Some(subject_id) = subject_id {
            tx.execute(
                "UPDATE ZeitraumHatNote SET fach_id = ?1 WHERE note_id = ?2;",
                params![subject_id, grade_id],
            )?;
        }

        tx.commit()?;
        Ok(true)
    }

    fn delete_period(&self, period_id: PeriodId) -> RepoResult<bool> {
        delete_with_cascade(self.conn, LinkOwner::Period, period_id)
    }

    fn delete_subject(&self, subject_id: SubjectId) -> RepoResult<bool> {
        delete_with_cascade(self.conn, LinkOwner::Subject, subject_id)
    }

    fn delete_grade(&self, grade_id: GradeId) -> RepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM ZeitraumHatNote WHERE note_id = ?1;", [grade_id])?;
        let changed = tx.execute("DELETE FROM Note WHERE id = ?1;", [grade_id])?;
        tx.commit()?;
        Ok(changed > 0)
    }
}

fn delete_with_cascade(conn: &Connection, owner: LinkOwner, owner_id: i64) -> RepoResult<bool> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let column = owner.link_column();

    let linked_grades = list_linked_grade_ids(&tx, column, owner_id)?;
    tx.execute(
        &format!("DELETE FROM ZeitraumHatNote WHERE {column} = ?1;"),
        [owner_id],
    )?;

    for grade_id in linked_grades {
        let still_linked: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM ZeitraumHatNote WHERE note_id = ?1);",
            [grade_id],
            |row| row.get(0),
        )?;
        if still_linked == 1 {
            continue;
        }
        tx.execute("DELETE FROM Note WHERE id = ?1;", [grade_id])?;
    }

    let changed = tx.execute(
        &format!("DELETE FROM {} WHERE id = ?1;", owner.owner_table()),
        [owner_id],
    )?;

    tx.commit()?;
    Ok(changed > 0)
}

fn list_linked_grade_ids(
    tx: &Transaction<'_>,
    column: &str,
    owner_id: i64,
) -> RepoResult<Vec<GradeId>> {
    let mut stmt = tx.prepare(&format!(
        "SELECT DISTINCT note_id FROM ZeitraumHatNote WHERE {column} = ?1 ORDER BY note_id;"
    ))?;
    let mut rows = stmt.query([owner_id])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }
    Ok(ids)
}

fn parse_period_row(row: &Row<'_>) -> RepoResult<Period> {
    Ok(Period {
        id: row.get("id")?,
        quarter: row.get("quartal")?,
        stage: row.get("stufe")?,
    })
}

fn parse_grade_entry_row(row: &Row<'_>) -> RepoResult<GradeEntry> {
    Ok(GradeEntry {
        grade_id: row.get("grade_id")?,
        period_id: row.get("period_id")?,
        subject_id: row.get("subject_id")?,
        subject_name: row.get("subject_name")?,
        teacher: row.get("teacher")?,
        written: row.get("written")?,
        oral: row.get("oral")?,
        weighting: row.get("weighting")?,
        overall: row.get("overall")?,
    })
}
