//! Fuzzy entity resolution between donor business names and the vendor
//! directory / contract-award registries.
//!
//! A donor and a registry entry match when, after uppercasing and trimming,
//! both names are at least [`MIN_NAME_LEN`] characters, their
//! [`token_sort_ratio`] is at least [`SIMILARITY_THRESHOLD`], and they share
//! at least [`MIN_SHARED_WORDS`] words.

use std::collections::HashSet;

use rusqlite::Connection;

use crate::error::Result;
use crate::models::{ContractMatch, VendorMatch};

pub const SIMILARITY_THRESHOLD: f64 = 93.0;
pub const MIN_SHARED_WORDS: usize = 2;
pub const MIN_NAME_LEN: usize = 6;

fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Normalized indel similarity in 0..=100: `2 * LCS / (len_a + len_b)`.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * lcs_len(&a, &b) as f64 / total as f64
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// [`ratio`] over whitespace tokens sorted alphabetically, so word order
/// does not matter.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

pub fn word_overlap(a: &str, b: &str) -> usize {
    let left: HashSet<&str> = a.split_whitespace().collect();
    let right: HashSet<&str> = b.split_whitespace().collect();
    left.intersection(&right).count()
}

pub fn normalize(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Similarity score when the two normalized names match, `None` otherwise.
pub fn score(donor: &str, entry: &str) -> Option<f64> {
    if donor.chars().count() < MIN_NAME_LEN || entry.chars().count() < MIN_NAME_LEN {
        return None;
    }
    let similarity = token_sort_ratio(donor, entry);
    if similarity >= SIMILARITY_THRESHOLD && word_overlap(donor, entry) >= MIN_SHARED_WORDS {
        Some((similarity * 100.0).round() / 100.0)
    } else {
        None
    }
}

pub struct DonorBusiness {
    pub name: String,
    pub normalized: String,
    pub donated: f64,
}

pub struct CrossMatch {
    pub donor: usize,
    pub entry: usize,
    pub similarity: f64,
}

/// Every (donor, entry) pair that matches. `entries` must already be
/// normalized.
pub fn cross_reference(donors: &[DonorBusiness], entries: &[String]) -> Vec<CrossMatch> {
    let mut out = Vec::new();
    for (di, donor) in donors.iter().enumerate() {
        for (ei, entry) in entries.iter().enumerate() {
            if let Some(similarity) = score(&donor.normalized, entry) {
                out.push(CrossMatch {
                    donor: di,
                    entry: ei,
                    similarity,
                });
            }
        }
    }
    out
}

/// Business donors of one candidate, summed per normalized name. Negative
/// amounts (refunds) are ignored.
pub fn donor_businesses(conn: &Connection, candidate_id: i64) -> Result<Vec<DonorBusiness>> {
    let mut stmt = conn.prepare(
        "SELECT MIN(TRIM(business_name)), UPPER(TRIM(business_name)) AS norm, SUM(amount) \
         FROM contributions \
         WHERE candidate_id = ?1 AND business_name IS NOT NULL AND TRIM(business_name) != '' \
           AND amount >= 0 \
         GROUP BY norm ORDER BY norm",
    )?;
    let rows = stmt.query_map([candidate_id], |row| {
        Ok(DonorBusiness {
            name: row.get(0)?,
            normalized: row.get(1)?,
            donated: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

fn by_amount_desc(a_amount: f64, a_name: &str, b_amount: f64, b_name: &str) -> std::cmp::Ordering {
    b_amount
        .partial_cmp(&a_amount)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then_with(|| a_name.cmp(b_name))
}

pub fn vendor_matches(conn: &Connection, candidate_id: i64) -> Result<Vec<VendorMatch>> {
    let donors = donor_businesses(conn, candidate_id)?;
    let mut stmt = conn.prepare("SELECT business_name, gross_sale_revenue FROM vendors ORDER BY id")?;
    let vendors: Vec<(String, Option<String>)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let normalized: Vec<String> = vendors.iter().map(|(n, _)| normalize(n)).collect();

    let mut matches: Vec<VendorMatch> = cross_reference(&donors, &normalized)
        .into_iter()
        .map(|m| VendorMatch {
            business_name: donors[m.donor].name.clone(),
            contribution_amount: donors[m.donor].donated,
            matched_vendor: vendors[m.entry].0.clone(),
            similarity: m.similarity,
            gross_sale_revenue: vendors[m.entry].1.clone(),
        })
        .collect();
    matches.sort_by(|a, b| {
        by_amount_desc(a.contribution_amount, &a.business_name, b.contribution_amount, &b.business_name)
    });
    Ok(matches)
}

pub fn contract_matches(conn: &Connection, candidate_id: i64) -> Result<Vec<ContractMatch>> {
    let donors = donor_businesses(conn, candidate_id)?;
    let mut stmt = conn.prepare("SELECT vendor, dollars_spent, status FROM contracts ORDER BY id")?;
    let contracts: Vec<(String, Option<String>, Option<String>)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let normalized: Vec<String> = contracts.iter().map(|(n, _, _)| normalize(n)).collect();

    let mut matches: Vec<ContractMatch> = cross_reference(&donors, &normalized)
        .into_iter()
        .map(|m| {
            let (vendor, value, status) = &contracts[m.entry];
            ContractMatch {
                donor_business: donors[m.donor].name.clone(),
                donated: donors[m.donor].donated,
                matched_vendor: vendor.clone(),
                contract_value: value.clone(),
                status: status.clone(),
                similarity: m.similarity,
            }
        })
        .collect();
    matches.sort_by(|a, b| by_amount_desc(a.donated, &a.donor_business, b.donated, &b.donor_business));
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    #[test]
    fn test_ratio_basics() {
        assert_eq!(ratio("", ""), 100.0);
        assert_eq!(ratio("abc", "abc"), 100.0);
        assert_eq!(ratio("abc", "xyz"), 0.0);
        // LCS("kitten", "sitting") = 4 ("ittn"), 2*4/13
        let r = ratio("kitten", "sitting");
        assert!((r - 61.538).abs() < 0.01, "got {r}");
    }

    #[test]
    fn test_token_sort_ratio_ignores_word_order() {
        assert_eq!(token_sort_ratio("BAUMANN SCOTLAND MCMANIMON", "MCMANIMON SCOTLAND BAUMANN"), 100.0);
        assert!(ratio("BAUMANN SCOTLAND MCMANIMON", "MCMANIMON SCOTLAND BAUMANN") < 100.0);
    }

    #[test]
    fn test_word_overlap() {
        assert_eq!(word_overlap("ACME PAVING LLC", "ACME PAVING INC"), 2);
        assert_eq!(word_overlap("ACME ACME", "ACME"), 1);
    }

    #[test]
    fn test_score_requires_similarity_and_shared_words() {
        assert!(score("ACME PAVING LLC", "ACME PAVING LLC").is_some());
        assert!(score("ACME PAVING LLC", "ACME PAVING LLC.").is_some());
        // Near-identical characters, no shared words.
        assert!(score("ACMEPAVING LLC", "ACME PAVINGLLC").is_none());
        // Shared words but too dissimilar.
        assert!(score("ACME PAVING AND ROAD WORKS LLC", "ACME PAVING").is_none());
        // Too short.
        assert!(score("AB CD", "AB CD").is_none());
    }

    fn seed(conn: &Connection) -> i64 {
        let cid: i64 = conn
            .query_row("SELECT id FROM candidates WHERE slug = 'James_Solomon'", [], |r| r.get(0))
            .unwrap();
        for (business, amount) in [
            ("Acme Paving LLC", 1000.0),
            ("ACME PAVING LLC ", 600.0),
            ("Wilentz Goldman & Spitzer", 5200.0),
            ("Refund Corp LLC", -50.0),
        ] {
            conn.execute(
                "INSERT INTO contributions (candidate_id, contributor_group, amount, business_name, contributor_name, source) \
                 VALUES (?1, 'Corporate', ?2, ?3, ?3, 'elec')",
                rusqlite::params![cid, amount, business],
            )
            .unwrap();
        }
        conn.execute(
            "INSERT INTO vendors (business_name, gross_sale_revenue) VALUES ('ACME PAVING, LLC', '$250,000')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO contracts (vendor, dollars_spent, status) VALUES ('Wilentz, Goldman & Spitzer', '$0', 'Awarded')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO contracts (vendor, dollars_spent, status) VALUES ('Refund Corp LLC', '$10', 'Open')",
            [],
        )
        .unwrap();
        cid
    }

    #[test]
    fn test_vendor_matches_aggregate_per_business() {
        let (_dir, conn) = test_db();
        let cid = seed(&conn);
        let matches = vendor_matches(&conn, cid).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].contribution_amount, 1600.0);
        assert_eq!(matches[0].matched_vendor, "ACME PAVING, LLC");
        assert_eq!(matches[0].gross_sale_revenue.as_deref(), Some("$250,000"));
    }

    #[test]
    fn test_contract_matches_skip_negative_donations() {
        let (_dir, conn) = test_db();
        let cid = seed(&conn);
        let matches = contract_matches(&conn, cid).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].donor_business, "Wilentz Goldman & Spitzer");
        assert_eq!(matches[0].donated, 5200.0);
        assert_eq!(matches[0].status.as_deref(), Some("Awarded"));
    }
}
