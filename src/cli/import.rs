use std::path::PathBuf;

use crate::db::get_connection;
use crate::error::Result;
use crate::importer::{import_file, ImportKind};
use crate::settings::get_db_path;

pub fn run(file: &str, kind: ImportKind, candidate: Option<&str>) -> Result<()> {
    let file_path = PathBuf::from(file);
    let conn = get_connection(&get_db_path())?;

    let result = import_file(&conn, &file_path, kind, candidate)?;

    if result.duplicate_file {
        println!("This file has already been imported (duplicate checksum).");
        return Ok(());
    }

    println!("{} imported, {} skipped (duplicates)", result.imported, result.skipped);
    if result.unmatched > 0 {
        println!("{} rows matched no registered candidate", result.unmatched);
    }
    Ok(())
}
