use std::path::PathBuf;

use rusqlite::Connection;

use crate::candidates::resolve_id;
use crate::db::get_connection;
use crate::donor_search::{Reply, SearchTransport};
use crate::error::{AppError, Result};
use crate::models::{DonorRecord, SearchResponse};

pub const MISSING_QUERY: &str = "Missing query";

/// Look a donor up by name within one candidate's contributions.
///
/// The query is trimmed and lowercased. An exact name match returns every
/// record of that donor; otherwise names containing the query come back as
/// suggestions in first-seen order. `None` means the query was empty.
pub fn search_donor(conn: &Connection, candidate_id: i64, query: &str) -> Result<Option<SearchResponse>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Ok(None);
    }

    let mut stmt = conn.prepare(
        "SELECT contributor_name, amount, employer, city, contribution_date, contributor_group \
         FROM contributions WHERE candidate_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map([candidate_id], |row| {
        Ok(DonorRecord {
            contributor_name: row.get(0)?,
            contribution_amount: row.get(1)?,
            employer: row.get(2)?,
            donor_city: row.get(3)?,
            contribution_date: row.get(4)?,
            contributor_group: Some(
                row.get::<_, Option<String>>(5)?
                    .unwrap_or_else(|| "Unknown".to_string()),
            ),
        })
    })?;

    let mut exact = Vec::new();
    let mut suggestions: Vec<String> = Vec::new();
    for record in rows {
        let record = record?;
        let lower = record.contributor_name.to_lowercase();
        if lower == needle {
            exact.push(record);
        } else if exact.is_empty()
            && lower.contains(&needle)
            && !suggestions.contains(&record.contributor_name)
        {
            suggestions.push(record.contributor_name);
        }
    }

    if !exact.is_empty() {
        return Ok(Some(SearchResponse::found(&needle, exact)));
    }
    Ok(Some(SearchResponse::not_found(&needle, suggestions)))
}

/// Answer a search for a candidate identifier the way the API does.
pub fn respond(conn: &Connection, candidate: &str, query: &str) -> Result<SearchResponse> {
    let (candidate_id, _) = match resolve_id(conn, candidate) {
        Ok(found) => found,
        Err(AppError::UnknownCandidate(id)) => {
            return Ok(SearchResponse::error(format!("Unknown candidate: {id}")))
        }
        Err(e) => return Err(e),
    };
    Ok(search_donor(conn, candidate_id, query)?
        .unwrap_or_else(|| SearchResponse::error(MISSING_QUERY)))
}

/// Searches the local database directly, one connection per lookup.
pub struct LocalSearch {
    db_path: PathBuf,
}

impl LocalSearch {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }
}

impl SearchTransport for LocalSearch {
    fn search_donor(&self, candidate: &str, query: &str) -> Reply {
        let result = get_connection(&self.db_path).and_then(|conn| respond(&conn, candidate, query));
        match result {
            Ok(response) => Reply::Response(response),
            Err(e) => Reply::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::models::SearchOutcome;
    use crate::reports::tests::{insert, row, solomon, Row};

    fn seeded() -> (tempfile::TempDir, Connection, i64) {
        let (dir, conn) = test_db();
        let cid = solomon(&conn);
        insert(&conn, cid, &Row {
            business: Some("McManimon Scotland & Baumann LLC"),
            date: Some("2025-01-10"),
            ..row("Corporate", 5400.0)
        });
        insert(&conn, cid, &Row { business: Some("Sal Electric Co"), ..row("Corporate", 500.0) });
        insert(&conn, cid, &Row { business: Some("Sal Electric Inc"), ..row("Corporate", 250.0) });
        insert(&conn, cid, &Row { business: Some("Sal Electric Co"), ..row("Corporate", 100.0) });
        (dir, conn, cid)
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let (_dir, conn, cid) = seeded();
        let resp = search_donor(&conn, cid, "  mcmanimon scotland & baumann llc ").unwrap().unwrap();
        match resp {
            SearchResponse::Outcome(SearchOutcome::Found { donor, records }) => {
                assert_eq!(donor, "mcmanimon scotland & baumann llc");
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].contribution_amount, 5400.0);
                assert_eq!(records[0].contributor_group.as_deref(), Some("Corporate"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_substring_gives_unique_suggestions() {
        let (_dir, conn, cid) = seeded();
        let resp = search_donor(&conn, cid, "Sal Electric").unwrap().unwrap();
        assert_eq!(
            resp,
            SearchResponse::not_found(
                "sal electric",
                vec!["Sal Electric Co".to_string(), "Sal Electric Inc".to_string()]
            )
        );
    }

    #[test]
    fn test_no_match_gives_empty_suggestions() {
        let (_dir, conn, cid) = seeded();
        let resp = search_donor(&conn, cid, "zzz").unwrap().unwrap();
        assert_eq!(resp, SearchResponse::not_found("zzz", vec![]));
    }

    #[test]
    fn test_blank_query_is_missing() {
        let (_dir, conn, cid) = seeded();
        assert!(search_donor(&conn, cid, "   ").unwrap().is_none());
        assert_eq!(
            respond(&conn, "JamesSolomon", "  ").unwrap(),
            SearchResponse::error(MISSING_QUERY)
        );
    }

    #[test]
    fn test_respond_unknown_candidate() {
        let (_dir, conn, _) = seeded();
        assert_eq!(
            respond(&conn, "Nobody", "sal").unwrap(),
            SearchResponse::error("Unknown candidate: Nobody")
        );
    }

    #[test]
    fn test_local_search_drives_the_widget() {
        use crate::donor_search::{DonorSearch, SearchState};

        let (dir, conn, _) = seeded();
        drop(conn);
        let transport = LocalSearch::new(dir.path().join("test.db"));
        let mut widget = DonorSearch::new("James_Solomon");
        let ticket = widget.submit_query("Sal Electric");
        widget.run(ticket, &transport);
        assert_eq!(widget.suggestions().len(), 2);

        let ticket = widget.select_suggestion("Sal Electric Co");
        widget.run(Some(ticket), &transport);
        assert!(matches!(widget.state(), SearchState::Found(r) if r.len() == 2));
    }
}
