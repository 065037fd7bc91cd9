//! Candidate registry: one canonical slug per candidate.
//!
//! Slugs are what the API paths and the CSV export names use. Any spelling a
//! caller might reach for (`MussabAli`, `Mussab_Ali`, `mussab ali`) resolves
//! to the same entry by comparing alphanumeric-only lowercase keys.

use rusqlite::Connection;

use crate::error::{AppError, Result};
use crate::models::Candidate;

/// Lowercase ASCII alphanumerics only. Two identifiers that differ solely in
/// case, spacing or punctuation share a key.
pub fn canonical_key(id: &str) -> String {
    id.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Build a slug from a display name: words joined by `_`, punctuation dropped.
/// `Bill O'Dea` -> `Bill_ODea`.
pub fn slugify(display_name: &str) -> String {
    display_name
        .split_whitespace()
        .map(|w| w.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    candidates: Vec<Candidate>,
}

impl Registry {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    pub fn load(conn: &Connection) -> Result<Self> {
        Ok(Self::new(list_candidates(conn)?))
    }

    /// Look up by slug or display name in any spelling.
    pub fn resolve(&self, id: &str) -> Option<&Candidate> {
        let key = canonical_key(id);
        if key.is_empty() {
            return None;
        }
        self.candidates
            .iter()
            .find(|c| canonical_key(&c.slug) == key || canonical_key(&c.display_name) == key)
    }

    pub fn require(&self, id: &str) -> Result<&Candidate> {
        self.resolve(id)
            .ok_or_else(|| AppError::UnknownCandidate(id.to_string()))
    }
}

pub fn list_candidates(conn: &Connection) -> Result<Vec<Candidate>> {
    let mut stmt = conn.prepare(
        "SELECT slug, display_name, bio, photo, recipient_first, recipient_last \
         FROM candidates ORDER BY display_name",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Candidate {
            slug: row.get(0)?,
            display_name: row.get(1)?,
            bio: row.get(2)?,
            photo: row.get(3)?,
            recipient_first: row.get(4)?,
            recipient_last: row.get(5)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Resolve an identifier to its stored row id and registry entry.
pub fn resolve_id(conn: &Connection, id: &str) -> Result<(i64, Candidate)> {
    let registry = Registry::load(conn)?;
    let candidate = registry.require(id)?.clone();
    let row_id: i64 = conn.query_row(
        "SELECT id FROM candidates WHERE slug = ?1",
        [&candidate.slug],
        |r| r.get(0),
    )?;
    Ok((row_id, candidate))
}

pub fn add_candidate(
    conn: &Connection,
    display_name: &str,
    recipient_first: &str,
    recipient_last: &str,
    bio: Option<&str>,
) -> Result<Candidate> {
    let slug = slugify(display_name);
    if slug.is_empty() {
        return Err(AppError::Other("Candidate name cannot be empty".to_string()));
    }
    if Registry::load(conn)?.resolve(&slug).is_some() {
        return Err(AppError::Other(format!("Candidate already exists: {slug}")));
    }
    let photo = format!("{}.jpg", slug.to_lowercase());
    conn.execute(
        "INSERT INTO candidates (slug, display_name, bio, photo, recipient_first, recipient_last) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![slug, display_name, bio, photo, recipient_first, recipient_last],
    )?;
    Ok(Candidate {
        slug,
        display_name: display_name.to_string(),
        bio: bio.map(str::to_string),
        photo: Some(photo),
        recipient_first: recipient_first.to_string(),
        recipient_last: recipient_last.to_string(),
    })
}
