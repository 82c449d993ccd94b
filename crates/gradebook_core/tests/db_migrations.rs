use gradebook_core::db::migrations::latest_version;
use gradebook_core::db::{open_db, open_db_in_memory, schema_version, table_row_count, DbError};
use gradebook_core::{GradeRepository, RepoError, SqliteGradeRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    for table in ["Fach", "Zeitraum", "Note", "ZeitraumHatNote"] {
        assert_table_exists(&conn, table);
    }
    assert_no_table_like(&conn, "%_v1");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noten.db");

    let conn_first = open_db(&path).unwrap();
    let repo = SqliteGradeRepository::try_new(&conn_first).unwrap();
    repo.add_period(&gradebook_core::PeriodFields::new(1, 11))
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second).unwrap(), latest_version());
    assert_eq!(table_row_count(&conn_second, "Zeitraum").unwrap(), Some(1));
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn legacy_database_is_adopted_and_rows_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noten.db");
    write_legacy_database(&path);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), latest_version());

    let repo = SqliteGradeRepository::try_new(&conn).unwrap();
    let periods = repo.list_periods().unwrap();
    assert_eq!(periods.len(), 1);
    assert_eq!((periods[0].quarter, periods[0].stage), (2, 11));

    let subjects = repo.list_subjects().unwrap();
    assert_eq!(subjects.len(), 2);
    assert_eq!(subjects[0].name, "Deutsch");
    assert_eq!(subjects[0].teacher, None, "blank legacy teacher becomes null");
    assert_eq!(subjects[1].teacher.as_deref(), Some("Hr. Berg"));

    let grades = repo.list_grades_for_period(periods[0].id).unwrap();
    assert_eq!(grades.len(), 1);
    assert_eq!(grades[0].grade_id, 1);
    assert_eq!(grades[0].weighting, 0.25);
    assert_eq!(grades[0].overall, Some(75.0));
}

#[test]
fn legacy_migration_drops_dangling_links_and_unlinked_grades() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noten.db");
    write_legacy_database(&path);

    let conn = open_db(&path).unwrap();
    assert_eq!(table_row_count(&conn, "ZeitraumHatNote").unwrap(), Some(1));
    assert_eq!(table_row_count(&conn, "Note").unwrap(), Some(1));
}

#[test]
fn legacy_nullable_database_is_adopted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noten.db");
    write_nullable_legacy_database(&path);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    assert_no_table_like(&conn, "%_v1");

    let repo = SqliteGradeRepository::try_new(&conn).unwrap();
    let subjects = repo.list_subjects().unwrap();
    assert_eq!(subjects.len(), 1);
    assert_eq!(subjects[0].teacher, None);

    let grades = repo.list_grades_for_period(1).unwrap();
    assert_eq!(grades.len(), 2);
    let partial = grades.iter().find(|entry| entry.grade_id == 1).unwrap();
    assert_eq!(partial.written, Some(10));
    assert_eq!(partial.oral, None);
    assert_eq!(partial.weighting, 0.5);
    assert_eq!(partial.overall, None);
    let complete = grades.iter().find(|entry| entry.grade_id == 2).unwrap();
    assert_eq!((complete.written, complete.oral), (Some(80), Some(60)));
    assert_eq!(complete.overall, Some(75.0));
}

#[test]
fn stored_periods_outside_writable_range_are_still_listed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noten.db");
    write_nullable_legacy_database(&path);
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("INSERT INTO Zeitraum (quartal, stufe) VALUES (2, 2024), (0, -1);")
        .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    let repo = SqliteGradeRepository::try_new(&conn).unwrap();
    let periods = repo.list_periods().unwrap();
    let values: Vec<(i64, i64)> = periods
        .iter()
        .map(|period| (period.quarter, period.stage))
        .collect();
    assert_eq!(values, vec![(0, -1), (1, 11), (2, 2024)]);

    let broken = periods[0].id;
    assert!(repo
        .edit_period(broken, &gradebook_core::PeriodFields::new(1, 12))
        .unwrap());
    let repaired = repo.list_periods().unwrap();
    assert!(repaired
        .iter()
        .any(|period| period.id == broken && (period.quarter, period.stage) == (1, 12)));
}

#[test]
fn migrated_schema_accepts_null_scores_and_teacher() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO Fach (name, lehrer) VALUES ('Kunst', NULL);", [])
        .unwrap();
    conn.execute(
        "INSERT INTO Note (schriftlich, muendlich, gewichtung, insgesamt) VALUES (NULL, 12, 0.5, NULL);",
        [],
    )
    .unwrap();
}

#[test]
fn link_rows_must_reference_existing_rows() {
    let conn = open_db_in_memory().unwrap();
    let err = conn
        .execute(
            "INSERT INTO ZeitraumHatNote (zeitraum_id, fach_id, note_id) VALUES (1, 1, 1);",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("FOREIGN KEY"));
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteGradeRepository::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("Fach")));
}

#[test]
fn table_row_count_ignores_unknown_tables() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(table_row_count(&conn, "sqlite_master").unwrap(), None);
    assert_eq!(table_row_count(&conn, "Note").unwrap(), Some(0));
}

/// Writes a database in the shape the first release produced: no
/// user_version, NOT NULL scores, one dangling link and one unlinked grade.
fn write_legacy_database(path: &std::path::Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE "Fach" (
            "id" INTEGER NOT NULL, "name" TEXT NOT NULL, "lehrer" TEXT NOT NULL,
            PRIMARY KEY("id" AUTOINCREMENT)
        );
        CREATE TABLE "Note" (
            "id" INTEGER NOT NULL, "schriftlich" INTEGER NOT NULL,
            "muendlich" INTEGER NOT NULL, "gewichtung" INTEGER NOT NULL,
            "insgesamt" INTEGER NOT NULL,
            PRIMARY KEY("id" AUTOINCREMENT)
        );
        CREATE TABLE "Zeitraum" (
            "id" INTEGER NOT NULL, "quartal" INTEGER NOT NULL, "stufe" INTEGER NOT NULL,
            PRIMARY KEY("id" AUTOINCREMENT)
        );
        CREATE TABLE "ZeitraumHatNote" (
            "zeitraum_id" INTEGER NOT NULL, "fach_id" INTEGER NOT NULL, "note_id" INTEGER NOT NULL,
            PRIMARY KEY("zeitraum_id","fach_id","note_id")
        );
        INSERT INTO Fach (name, lehrer) VALUES ('Deutsch', ''), ('Mathe', 'Hr. Berg');
        INSERT INTO Zeitraum (quartal, stufe) VALUES (2, 11);
        INSERT INTO Note (schriftlich, muendlich, gewichtung, insgesamt) VALUES (80, 60, 0.25, 75.0);
        INSERT INTO Note (schriftlich, muendlich, gewichtung, insgesamt) VALUES (10, 10, 0.5, 10.0);
        INSERT INTO ZeitraumHatNote (zeitraum_id, fach_id, note_id) VALUES (1, 2, 1);
        INSERT INTO ZeitraumHatNote (zeitraum_id, fach_id, note_id) VALUES (7, 2, 2);
        "#,
    )
    .unwrap();
}

/// Writes a database in the later unversioned shape: user_version 0,
/// nullable teacher and scores, `muendlich` declared before `schriftlich`.
fn write_nullable_legacy_database(path: &std::path::Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE "Fach" (
            "id" INTEGER NOT NULL, "name" TEXT NOT NULL, "lehrer" TEXT,
            PRIMARY KEY("id" AUTOINCREMENT)
        );
        CREATE TABLE "Note" (
            "id" INTEGER NOT NULL, "muendlich" INTEGER, "schriftlich" INTEGER,
            "gewichtung" INTEGER NOT NULL, "insgesamt" INTEGER,
            PRIMARY KEY("id" AUTOINCREMENT)
        );
        CREATE TABLE "Zeitraum" (
            "id" INTEGER NOT NULL, "quartal" INTEGER NOT NULL, "stufe" INTEGER NOT NULL,
            PRIMARY KEY("id" AUTOINCREMENT)
        );
        CREATE TABLE "ZeitraumHatNote" (
            "zeitraum_id" INTEGER NOT NULL, "fach_id" INTEGER NOT NULL, "note_id" INTEGER NOT NULL,
            PRIMARY KEY("zeitraum_id","fach_id","note_id")
        );
        INSERT INTO Fach (name, lehrer) VALUES ('Physik', NULL);
        INSERT INTO Zeitraum (quartal, stufe) VALUES (1, 11);
        INSERT INTO Note (muendlich, schriftlich, gewichtung, insgesamt) VALUES (NULL, 10, 0.5, NULL);
        INSERT INTO Note (muendlich, schriftlich, gewichtung, insgesamt) VALUES (60, 80, 0.25, 75.0);
        INSERT INTO ZeitraumHatNote (zeitraum_id, fach_id, note_id) VALUES (1, 1, 1), (1, 1, 2);
        "#,
    )
    .unwrap();
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}

fn assert_no_table_like(conn: &Connection, pattern: &str) {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name LIKE ?1;",
            [pattern],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 0, "leftover tables matching {pattern}");
}
