use std::collections::BTreeMap;
use std::io::Write;

use rusqlite::Connection;

use crate::error::Result;
use crate::models::{
    BarChartPayload, ChartDataset, ContributionGroupRecord, RepeatFrequency, RepeatedDonor,
    TopDonorRow, TotalDonations,
};

/// Bar colors, in order. Payloads use the first `labels.len()` of them.
pub const PALETTE: [&str; 10] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#af7aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

pub const TOP_N: usize = 10;
pub const REPEAT_FREQUENCY_DONORS: usize = 5;
pub const TIMELINE_COLOR: &str = "#27ae60";

pub fn bar_payload(label: &str, rows: Vec<(String, f64)>) -> BarChartPayload {
    let (labels, data): (Vec<String>, Vec<f64>) = rows.into_iter().take(TOP_N).unzip();
    let background_color = PALETTE
        .iter()
        .take(labels.len())
        .map(|c| c.to_string())
        .collect();
    BarChartPayload {
        labels,
        datasets: vec![ChartDataset {
            label: Some(label.to_string()),
            data,
            background_color,
            border_color: None,
        }],
    }
}

fn name_totals(conn: &Connection, sql: &str, candidate_id: i64) -> Result<Vec<(String, f64)>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([candidate_id], |row| Ok((row.get(0)?, row.get(1)?)))?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

// ---------------------------------------------------------------------------
// Group breakdown
// ---------------------------------------------------------------------------

pub fn contributions_by_group(conn: &Connection, candidate_id: i64) -> Result<Vec<ContributionGroupRecord>> {
    let rows = name_totals(
        conn,
        "SELECT contributor_group, SUM(amount) FROM contributions \
         WHERE candidate_id = ?1 GROUP BY contributor_group ORDER BY contributor_group",
        candidate_id,
    )?;
    Ok(rows
        .into_iter()
        .map(|(contributor_group, contribution_amount)| ContributionGroupRecord {
            contributor_group,
            contribution_amount,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Top donors / employers
// ---------------------------------------------------------------------------

fn top_donor_totals(conn: &Connection, candidate_id: i64) -> Result<Vec<(String, f64)>> {
    name_totals(
        conn,
        "SELECT contributor_name, SUM(amount) AS total FROM contributions \
         WHERE candidate_id = ?1 GROUP BY contributor_name \
         ORDER BY total DESC, contributor_name LIMIT 10",
        candidate_id,
    )
}

pub fn top_donors_bar(conn: &Connection, candidate_id: i64) -> Result<BarChartPayload> {
    Ok(bar_payload("Donation Amount", top_donor_totals(conn, candidate_id)?))
}

/// Top donors with the employer and city of each donor's first stored row.
pub fn top_donors_table(conn: &Connection, candidate_id: i64) -> Result<Vec<TopDonorRow>> {
    let mut stmt = conn.prepare(
        "SELECT employer, city FROM contributions \
         WHERE candidate_id = ?1 AND contributor_name = ?2 ORDER BY id LIMIT 1",
    )?;
    let mut out = Vec::new();
    for (name, total) in top_donor_totals(conn, candidate_id)? {
        let (employer, donor_city): (Option<String>, Option<String>) =
            stmt.query_row(rusqlite::params![candidate_id, name], |r| Ok((r.get(0)?, r.get(1)?)))?;
        out.push(TopDonorRow {
            contributor_name: name,
            contribution_amount: total,
            employer,
            donor_city,
        });
    }
    Ok(out)
}

pub fn top_employers_bar(conn: &Connection, candidate_id: i64) -> Result<BarChartPayload> {
    let rows = name_totals(
        conn,
        "SELECT employer, SUM(amount) AS total FROM contributions \
         WHERE candidate_id = ?1 AND employer IS NOT NULL AND TRIM(employer) != '' \
         GROUP BY employer ORDER BY total DESC, employer LIMIT 10",
        candidate_id,
    )?;
    Ok(bar_payload("Donation Amount by Employer", rows))
}

// ---------------------------------------------------------------------------
// Repeat donors
// ---------------------------------------------------------------------------

pub fn repeated_donors(conn: &Connection, candidate_id: i64) -> Result<Vec<RepeatedDonor>> {
    let rows = name_totals(
        conn,
        "SELECT contributor_name, SUM(amount) AS total FROM contributions \
         WHERE candidate_id = ?1 GROUP BY contributor_name HAVING COUNT(*) > 1 \
         ORDER BY total DESC, contributor_name LIMIT 10",
        candidate_id,
    )?;
    Ok(rows
        .into_iter()
        .map(|(contributor_name, total_amount)| RepeatedDonor {
            contributor_name,
            total_amount,
        })
        .collect())
}

pub fn repeated_donors_bar(conn: &Connection, candidate_id: i64) -> Result<BarChartPayload> {
    let rows = repeated_donors(conn, candidate_id)?
        .into_iter()
        .map(|d| (d.contributor_name, d.total_amount))
        .collect();
    Ok(bar_payload("Total Donations", rows))
}

/// Monthly contribution counts for the individuals who gave in the most
/// distinct months. Only dated rows with both name parts count.
pub fn repeat_frequency(conn: &Connection, candidate_id: i64) -> Result<RepeatFrequency> {
    let mut stmt = conn.prepare(
        "SELECT TRIM(TRIM(first_name) || ' ' || TRIM(last_name)) AS donor, \
                SUBSTR(contribution_date, 1, 7) AS month, COUNT(*) \
         FROM contributions \
         WHERE candidate_id = ?1 AND contribution_date IS NOT NULL \
           AND first_name IS NOT NULL AND last_name IS NOT NULL \
         GROUP BY donor, month ORDER BY donor, month",
    )?;
    let rows: Vec<(String, String, i64)> = stmt
        .query_map([candidate_id], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut per_donor: BTreeMap<String, BTreeMap<String, i64>> = BTreeMap::new();
    for (donor, month, count) in rows {
        per_donor.entry(donor).or_default().insert(month, count);
    }
    let mut ranked: Vec<(String, BTreeMap<String, i64>)> = per_donor.into_iter().collect();
    // Stable sort keeps alphabetical order among donors with equal month counts.
    ranked.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
    Ok(ranked.into_iter().take(REPEAT_FREQUENCY_DONORS).collect())
}

// ---------------------------------------------------------------------------
// Timeline and totals
// ---------------------------------------------------------------------------

pub fn monthly_totals(conn: &Connection, candidate_id: i64) -> Result<Vec<(String, f64)>> {
    name_totals(
        conn,
        "SELECT SUBSTR(contribution_date, 1, 7) AS month, SUM(amount) FROM contributions \
         WHERE candidate_id = ?1 AND contribution_date IS NOT NULL \
         GROUP BY month ORDER BY month",
        candidate_id,
    )
}

pub fn donations_over_time(conn: &Connection, candidate_id: i64) -> Result<BarChartPayload> {
    let (labels, data): (Vec<String>, Vec<f64>) = monthly_totals(conn, candidate_id)?.into_iter().unzip();
    Ok(BarChartPayload {
        labels,
        datasets: vec![ChartDataset {
            label: Some("Donations".to_string()),
            data,
            background_color: Vec::new(),
            border_color: Some(TIMELINE_COLOR.to_string()),
        }],
    })
}

/// Sum over distinct rows, rounded to cents.
pub fn total_donations(conn: &Connection, candidate_id: i64, slug: &str) -> Result<TotalDonations> {
    let total: f64 = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM ( \
           SELECT DISTINCT contributor_group, amount, first_name, last_name, business_name, \
                  contribution_date, employer, occupation, city, state \
           FROM contributions WHERE candidate_id = ?1)",
        [candidate_id],
        |r| r.get(0),
    )?;
    Ok(TotalDonations {
        candidate: slug.to_string(),
        total_donations: (total * 100.0).round() / 100.0,
    })
}

// ---------------------------------------------------------------------------
// Combined CSV export
// ---------------------------------------------------------------------------

pub const EXPORT_HEADER: [&str; 12] = [
    "ContributorGroup",
    "ContributionAmount",
    "First_Name",
    "Last_Name",
    "Business_Name",
    "ContributorName",
    "ContributionDate",
    "Employer",
    "Occupation",
    "Donor_City",
    "Donor_State",
    "Source",
];

pub fn export_filename(slug: &str) -> String {
    format!("{slug}_combined_contributions.csv")
}

/// Write every stored contribution of one candidate. Returns the row count.
pub fn write_combined_csv<W: Write>(conn: &Connection, candidate_id: i64, out: W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(EXPORT_HEADER)?;

    let mut stmt = conn.prepare(
        "SELECT contributor_group, amount, first_name, last_name, business_name, contributor_name, \
                contribution_date, employer, occupation, city, state, source \
         FROM contributions WHERE candidate_id = ?1 ORDER BY contribution_date, id",
    )?;
    let mut rows = stmt.query([candidate_id])?;
    let mut count = 0;
    while let Some(row) = rows.next()? {
        let text = |i: usize| -> rusqlite::Result<String> {
            Ok(row.get::<_, Option<String>>(i)?.unwrap_or_default())
        };
        let amount: f64 = row.get(1)?;
        wtr.write_record([
            text(0)?,
            format!("{amount:.2}"),
            text(2)?,
            text(3)?,
            text(4)?,
            text(5)?,
            text(6)?,
            text(7)?,
            text(8)?,
            text(9)?,
            text(10)?,
            text(11)?,
        ])?;
        count += 1;
    }
    wtr.flush()?;
    Ok(count)
}
