use comfy_table::{Cell, Table};

use crate::candidates::{add_candidate, list_candidates};
use crate::db::get_connection;
use crate::error::Result;
use crate::settings::get_db_path;

pub fn list() -> Result<()> {
    let conn = get_connection(&get_db_path())?;
    let candidates = list_candidates(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["Slug", "Name", "P2P Recipient", "Bio"]);
    for c in candidates {
        table.add_row(vec![
            Cell::new(&c.slug),
            Cell::new(&c.display_name),
            Cell::new(format!("{} {}", c.recipient_first, c.recipient_last)),
            Cell::new(c.bio.unwrap_or_default()),
        ]);
    }
    println!("Candidates\n{table}");
    Ok(())
}

pub fn add(name: &str, recipient_first: &str, recipient_last: &str, bio: Option<&str>) -> Result<()> {
    let conn = get_connection(&get_db_path())?;
    let candidate = add_candidate(&conn, name, recipient_first, recipient_last, bio)?;
    println!("Added candidate: {} ({})", candidate.display_name, candidate.slug);
    Ok(())
}
