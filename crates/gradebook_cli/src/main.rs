//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `gradebook_core` linkage without the UI bridge.
//! - With a database path, open (and migrate) it and print table counts.
//! - Keep output deterministic `key=value` lines for quick sanity checks.

use gradebook_core::db::{open_db, schema_version, table_row_count, GRADE_TABLES};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("gradebook_core ping={}", gradebook_core::ping());
    println!("gradebook_core version={}", gradebook_core::core_version());

    let Some(db_path) = std::env::args_os().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match inspect(std::path::Path::new(&db_path)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error={err}");
            ExitCode::FAILURE
        }
    }
}

fn inspect(path: &std::path::Path) -> Result<(), gradebook_core::db::DbError> {
    let conn = open_db(path)?;
    println!("db path={}", path.display());
    println!("db schema_version={}", schema_version(&conn)?);
    for table in GRADE_TABLES {
        if let Some(count) = table_row_count(&conn, table)? {
            println!("db rows.{table}={count}");
        }
    }
    Ok(())
}
