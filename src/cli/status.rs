use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::{format_bytes, number};
use crate::importer::ImportKind;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();

    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());
    println!("API:        {}", settings.api_base_url);

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let conn = get_connection(&db_path)?;
        let count = |table: &str| -> Result<i64> {
            Ok(conn.query_row(&format!("SELECT count(*) FROM {table}"), [], |r| r.get(0))?)
        };

        println!();
        println!("Candidates:     {}", number(count("candidates")?));
        println!("Contributions:  {}", number(count("contributions")?));
        println!("Vendors:        {}", number(count("vendors")?));
        println!("Contracts:      {}", number(count("contracts")?));
        println!("Imports:        {}", number(count("imports")?));

        let mut stmt = conn.prepare(
            "SELECT kind, count(*), COALESCE(sum(record_count), 0) FROM imports GROUP BY kind ORDER BY kind",
        )?;
        let rows: Vec<(String, i64, i64)> = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for (key, files, records) in rows {
            match ImportKind::from_key(&key) {
                Ok(kind) => println!(
                    "  {:<14}{} files, {} rows",
                    kind.label(),
                    number(files),
                    number(records)
                ),
                Err(e) => tracing::warn!(error = %e, "skipping import record"),
            }
        }
    } else {
        println!();
        println!("Database not found. Run `donortrail init` to set up.");
    }

    Ok(())
}
