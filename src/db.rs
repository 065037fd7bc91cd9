use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS candidates (
    id INTEGER PRIMARY KEY,
    slug TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    bio TEXT,
    photo TEXT,
    recipient_first TEXT NOT NULL,
    recipient_last TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    kind TEXT NOT NULL,
    candidate_id INTEGER,
    import_date TEXT DEFAULT (datetime('now')),
    record_count INTEGER,
    checksum TEXT,
    FOREIGN KEY (candidate_id) REFERENCES candidates(id)
);

CREATE TABLE IF NOT EXISTS contributions (
    id INTEGER PRIMARY KEY,
    candidate_id INTEGER NOT NULL,
    contributor_group TEXT,
    amount REAL NOT NULL,
    first_name TEXT,
    last_name TEXT,
    business_name TEXT,
    contributor_name TEXT NOT NULL,
    contribution_date TEXT,
    employer TEXT,
    occupation TEXT,
    city TEXT,
    state TEXT,
    source TEXT NOT NULL,
    import_id INTEGER,
    FOREIGN KEY (candidate_id) REFERENCES candidates(id),
    FOREIGN KEY (import_id) REFERENCES imports(id)
);

CREATE INDEX IF NOT EXISTS idx_contributions_candidate ON contributions(candidate_id);

CREATE TABLE IF NOT EXISTS vendors (
    id INTEGER PRIMARY KEY,
    business_name TEXT NOT NULL,
    gross_sale_revenue TEXT,
    import_id INTEGER,
    FOREIGN KEY (import_id) REFERENCES imports(id)
);

CREATE TABLE IF NOT EXISTS contracts (
    id INTEGER PRIMARY KEY,
    vendor TEXT NOT NULL,
    dollars_spent TEXT,
    status TEXT,
    description TEXT,
    import_id INTEGER,
    FOREIGN KEY (import_id) REFERENCES imports(id)
);
";

// (slug, display_name, bio, recipient_first, recipient_last)
const DEFAULT_CANDIDATES: &[(&str, &str, &str, &str, &str)] = &[
    ("Mussab_Ali", "Mussab Ali", "Former Jersey City Board of Education president.", "Mussab", "Ali"),
    ("Joyce_Watterman", "Joyce Watterman", "Jersey City Council President.", "Joyce", "Wattermann"),
    ("Jim_McGreevey", "Jim McGreevey", "Former Governor of New Jersey.", "Jim", "McGreevey"),
    ("James_Solomon", "James Solomon", "Jersey City Ward E Councilman.", "James", "Solomon"),
    ("Bill_ODea", "Bill O'Dea", "Hudson County Commissioner.", "Bill", "O'Dea"),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM candidates", [], |row| row.get(0))?;
    if count == 0 {
        for c in DEFAULT_CANDIDATES {
            conn.execute(
                "INSERT INTO candidates (slug, display_name, bio, photo, recipient_first, recipient_last) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![c.0, c.1, c.2, format!("{}.jpg", c.0.to_lowercase()), c.3, c.4],
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn test_db() -> (tempfile::TempDir, Connection) {
    let dir = tempfile::tempdir().unwrap();
    let conn = get_connection(&dir.path().join("test.db")).unwrap();
    init_db(&conn).unwrap();
    (dir, conn)
}
