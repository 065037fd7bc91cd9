use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::candidates::{list_candidates, resolve_id};
use crate::classifier::{classify_elec, classify_p2p, contributor_name, recipient_matches};
use crate::error::{AppError, Result};
use crate::models::{ParsedContract, ParsedContribution, ParsedP2pRow, ParsedVendor};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn parse_amount(raw: &str) -> f64 {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return -inner.trim().parse::<f64>().unwrap_or(0.0);
    }
    s.parse().unwrap_or(0.0)
}

/// Accepts `MM/DD/YYYY`, `YYYY-MM-DD` and `YYYY-MM-DD HH:MM:SS`; returns
/// `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let date_part = raw.split_whitespace().next().unwrap_or(raw);
    let parsed = if date_part.contains('/') {
        chrono::NaiveDate::parse_from_str(date_part, "%m/%d/%Y").ok()
    } else {
        chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    };
    parsed.map(|d| d.format("%Y-%m-%d").to_string())
}

pub fn excel_serial_to_date(serial: f64) -> Option<String> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = chrono::NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = base + chrono::Duration::days(serial as i64);
    Some(date.format("%Y-%m-%d").to_string())
}

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

// ---------------------------------------------------------------------------
// Tabular input: CSV or XLSX, first row is the header
// ---------------------------------------------------------------------------

pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    source: String,
}

impl Table {
    fn column(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.column(name).ok_or_else(|| AppError::MissingColumn {
            column: name.to_string(),
            file: self.source.clone(),
        })
    }
}

fn cell(row: &[String], idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| row.get(i))
        .map(|v| v.trim())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("nan"))
        .map(str::to_string)
}

fn read_csv_table(file_path: &Path) -> Result<Table> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    let headers = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let Ok(record) = result else { continue };
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(Table {
        headers,
        rows,
        source: file_path.display().to_string(),
    })
}

#[cfg(feature = "xlsx")]
fn read_xlsx_table(file_path: &Path) -> Result<Table> {
    use calamine::{Data, Reader};

    let mut workbook = calamine::open_workbook_auto(file_path)
        .map_err(|e| AppError::Other(format!("Failed to open workbook: {e}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::Other(format!("No sheets in {}", file_path.display())))?
        .map_err(|e| AppError::Other(format!("Failed to read sheet: {e}")))?;

    let to_text = |d: &Data| -> String {
        match d {
            Data::String(s) => s.clone(),
            Data::Float(f) if f.fract() == 0.0 => format!("{f:.0}"),
            Data::Float(f) => f.to_string(),
            Data::Int(i) => i.to_string(),
            Data::Bool(b) => b.to_string(),
            Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()).unwrap_or_default(),
            Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
            Data::Error(_) | Data::Empty => String::new(),
        }
    };

    let mut rows_iter = range.rows();
    let headers = rows_iter
        .next()
        .map(|r| r.iter().map(|c| to_text(c).trim().to_string()).collect())
        .unwrap_or_default();
    let rows = rows_iter
        .map(|r| r.iter().map(to_text).collect::<Vec<_>>())
        .filter(|r| r.iter().any(|v| !v.trim().is_empty()))
        .collect();
    Ok(Table {
        headers,
        rows,
        source: file_path.display().to_string(),
    })
}

fn is_workbook(file_path: &Path) -> bool {
    file_path
        .extension()
        .map_or(false, |e| e.eq_ignore_ascii_case("xlsx") || e.eq_ignore_ascii_case("xls"))
}

pub fn read_table(file_path: &Path) -> Result<Table> {
    if is_workbook(file_path) {
        #[cfg(feature = "xlsx")]
        return read_xlsx_table(file_path);
        #[cfg(not(feature = "xlsx"))]
        return Err(AppError::Other(
            "Workbook support is disabled; export the sheet to CSV".to_string(),
        ));
    }
    read_csv_table(file_path)
}

// ---------------------------------------------------------------------------
// Parsers
// ---------------------------------------------------------------------------

/// ELEC contribution export for a single candidate.
pub fn parse_elec_contributions(file_path: &Path) -> Result<Vec<ParsedContribution>> {
    let table = read_table(file_path)?;
    let amount_col = table.require("ContributionAmount")?;
    let type_col = table.column("ContributorType");
    let first_col = table.column("FirstName");
    let last_col = table.column("LastName");
    let business_col = table.column("NonIndName");
    let date_col = table.column("ContributionDate");
    let employer_col = table.column("EmpName");
    let occupation_col = table.column("OccupationName");
    let city_col = table.column("City");
    let state_col = table.column("State");

    let mut rows = Vec::new();
    for row in &table.rows {
        let Some(raw_amount) = cell(row, Some(amount_col)) else {
            continue;
        };
        let amount = parse_amount(&raw_amount);
        let contributor_type = cell(row, type_col).unwrap_or_default();
        rows.push(ParsedContribution {
            contributor_group: classify_elec(&contributor_type, amount),
            amount,
            first_name: cell(row, first_col),
            last_name: cell(row, last_col),
            business_name: cell(row, business_col),
            contribution_date: cell(row, date_col).and_then(|d| parse_date(&d)),
            employer: cell(row, employer_col),
            occupation: cell(row, occupation_col),
            city: cell(row, city_col),
            state: cell(row, state_col),
        });
    }
    Ok(rows)
}

/// Pay-to-play disclosure workbook covering every recipient.
pub fn parse_p2p(file_path: &Path) -> Result<Vec<ParsedP2pRow>> {
    let table = read_table(file_path)?;
    let recipient_col = table.require("Recipient_Name")?;
    let contributor_col = table.require("Contributor_Name")?;
    let amount_col = table.require("Aggregate_Contribution_Amount")?;
    let employer_col = table.column("Business_Name");
    let city_col = table.column("Contributor_City");
    let state_col = table.column("Contributor_State");

    let mut rows = Vec::new();
    for row in &table.rows {
        let (Some(recipient), Some(contributor)) =
            (cell(row, Some(recipient_col)), cell(row, Some(contributor_col)))
        else {
            continue;
        };
        let amount = cell(row, Some(amount_col))
            .map(|a| parse_amount(&a))
            .unwrap_or(0.0);
        rows.push(ParsedP2pRow {
            recipient_name: recipient,
            contribution: ParsedContribution {
                contributor_group: classify_p2p(&contributor, amount),
                amount,
                business_name: Some(contributor),
                employer: cell(row, employer_col),
                city: cell(row, city_col),
                state: cell(row, state_col),
                ..ParsedContribution::default()
            },
        });
    }
    Ok(rows)
}

pub fn parse_vendors(file_path: &Path) -> Result<Vec<ParsedVendor>> {
    let table = read_table(file_path)?;
    let name_col = table.require("Business Name")?;
    let revenue_col = table.column("Gross Sale Revenue");
    Ok(table
        .rows
        .iter()
        .filter_map(|row| {
            Some(ParsedVendor {
                business_name: cell(row, Some(name_col))?,
                gross_sale_revenue: cell(row, revenue_col),
            })
        })
        .collect())
}

pub fn parse_contracts(file_path: &Path) -> Result<Vec<ParsedContract>> {
    let table = read_table(file_path)?;
    let vendor_col = table.require("Vendor")?;
    let spent_col = table.column("Dollars Spent to Date");
    let status_col = table.column("Status");
    let description_col = table.column("Description");
    Ok(table
        .rows
        .iter()
        .filter_map(|row| {
            Some(ParsedContract {
                vendor: cell(row, Some(vendor_col))?,
                dollars_spent: cell(row, spent_col),
                status: cell(row, status_col),
                description: cell(row, description_col),
            })
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Import kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImportKind {
    Contributions,
    PayToPlay,
    Vendors,
    Contracts,
}

impl ImportKind {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Contributions => "contributions",
            Self::PayToPlay => "p2p",
            Self::Vendors => "vendors",
            Self::Contracts => "contracts",
        }
    }

    pub fn from_key(key: &str) -> Result<Self> {
        match key {
            "contributions" => Ok(Self::Contributions),
            "p2p" => Ok(Self::PayToPlay),
            "vendors" => Ok(Self::Vendors),
            "contracts" => Ok(Self::Contracts),
            other => Err(AppError::UnknownKind(other.to_string())),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Contributions => "Contributions",
            Self::PayToPlay => "Pay-to-play",
            Self::Vendors => "Vendors",
            Self::Contracts => "Contracts",
        }
    }

    pub fn needs_candidate(&self) -> bool {
        matches!(self, Self::Contributions)
    }
}

#[derive(Debug, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    /// Pay-to-play rows whose recipient matched no registered candidate.
    pub unmatched: usize,
    pub duplicate_file: bool,
}

impl ImportResult {
    fn duplicate() -> Self {
        Self {
            duplicate_file: true,
            ..Self::default()
        }
    }
}

fn begin_import(
    conn: &Connection,
    file_path: &Path,
    kind: ImportKind,
    candidate_id: Option<i64>,
) -> Result<Option<i64>> {
    let checksum = compute_checksum(file_path)?;
    let mut stmt = conn.prepare(
        "SELECT 1 FROM imports WHERE checksum = ?1 AND kind = ?2 AND candidate_id IS ?3",
    )?;
    if stmt.exists(rusqlite::params![checksum, kind.key(), candidate_id])? {
        return Ok(None);
    }
    conn.execute(
        "INSERT INTO imports (filename, kind, candidate_id, record_count, checksum) VALUES (?1, ?2, ?3, 0, ?4)",
        rusqlite::params![
            file_path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
            kind.key(),
            candidate_id,
            checksum,
        ],
    )?;
    Ok(Some(conn.last_insert_rowid()))
}

fn finish_import(conn: &Connection, import_id: i64, count: usize) -> Result<()> {
    conn.execute(
        "UPDATE imports SET record_count = ?1 WHERE id = ?2",
        rusqlite::params![count as i64, import_id],
    )?;
    Ok(())
}

/// Same row already stored by an earlier import (overlapping exports).
fn is_duplicate_contribution(
    conn: &Connection,
    candidate_id: i64,
    import_id: i64,
    row: &ParsedContribution,
    name: &str,
) -> Result<bool> {
    let mut stmt = conn.prepare_cached(
        "SELECT 1 FROM contributions WHERE candidate_id = ?1 AND amount = ?2 AND contributor_name = ?3 \
         AND contribution_date IS ?4 AND contributor_group IS ?5 AND import_id IS NOT ?6",
    )?;
    Ok(stmt.exists(rusqlite::params![
        candidate_id,
        row.amount,
        name,
        row.contribution_date,
        row.contributor_group,
        import_id,
    ])?)
}

fn insert_contribution(
    conn: &Connection,
    candidate_id: i64,
    import_id: i64,
    row: &ParsedContribution,
    source: &str,
) -> Result<bool> {
    let name = contributor_name(
        row.first_name.as_deref(),
        row.last_name.as_deref(),
        row.business_name.as_deref(),
    );
    if is_duplicate_contribution(conn, candidate_id, import_id, row, &name)? {
        return Ok(false);
    }
    conn.execute(
        "INSERT INTO contributions (candidate_id, contributor_group, amount, first_name, last_name, \
         business_name, contributor_name, contribution_date, employer, occupation, city, state, source, import_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        rusqlite::params![
            candidate_id,
            row.contributor_group,
            row.amount,
            row.first_name,
            row.last_name,
            row.business_name,
            name,
            row.contribution_date,
            row.employer,
            row.occupation,
            row.city,
            row.state,
            source,
            import_id,
        ],
    )?;
    Ok(true)
}

pub fn import_contributions(conn: &Connection, file_path: &Path, candidate: &str) -> Result<ImportResult> {
    let (candidate_id, candidate) = resolve_id(conn, candidate)?;
    let rows = parse_elec_contributions(file_path)?;

    let tx = conn.unchecked_transaction()?;
    let Some(import_id) = begin_import(&tx, file_path, ImportKind::Contributions, Some(candidate_id))? else {
        return Ok(ImportResult::duplicate());
    };
    let mut result = ImportResult::default();
    for row in &rows {
        if insert_contribution(&tx, candidate_id, import_id, row, "elec")? {
            result.imported += 1;
        } else {
            result.skipped += 1;
        }
    }
    finish_import(&tx, import_id, rows.len())?;
    tx.commit()?;

    info!(
        candidate = %candidate.slug,
        imported = result.imported,
        skipped = result.skipped,
        "imported contributions"
    );
    Ok(result)
}

/// Attribute every workbook row to each candidate whose recipient name it
/// matches.
pub fn import_p2p(conn: &Connection, file_path: &Path) -> Result<ImportResult> {
    let rows = parse_p2p(file_path)?;
    let candidates = list_candidates(conn)?;
    let mut ids = Vec::with_capacity(candidates.len());
    for c in &candidates {
        let id: i64 = conn.query_row("SELECT id FROM candidates WHERE slug = ?1", [&c.slug], |r| r.get(0))?;
        ids.push(id);
    }

    let tx = conn.unchecked_transaction()?;
    let Some(import_id) = begin_import(&tx, file_path, ImportKind::PayToPlay, None)? else {
        return Ok(ImportResult::duplicate());
    };
    let mut result = ImportResult::default();
    for row in &rows {
        let mut attributed = false;
        for (c, id) in candidates.iter().zip(&ids) {
            if !recipient_matches(&row.recipient_name, &c.recipient_first, &c.recipient_last) {
                continue;
            }
            attributed = true;
            if insert_contribution(&tx, *id, import_id, &row.contribution, "p2p")? {
                result.imported += 1;
            } else {
                result.skipped += 1;
            }
        }
        if !attributed {
            debug!(recipient = %row.recipient_name, "no candidate for pay-to-play row");
            result.unmatched += 1;
        }
    }
    finish_import(&tx, import_id, rows.len())?;
    tx.commit()?;

    info!(
        imported = result.imported,
        skipped = result.skipped,
        unmatched = result.unmatched,
        "imported pay-to-play workbook"
    );
    Ok(result)
}

pub fn import_vendors(conn: &Connection, file_path: &Path) -> Result<ImportResult> {
    let rows = parse_vendors(file_path)?;
    let tx = conn.unchecked_transaction()?;
    let Some(import_id) = begin_import(&tx, file_path, ImportKind::Vendors, None)? else {
        return Ok(ImportResult::duplicate());
    };
    let mut result = ImportResult::default();
    for row in &rows {
        let exists = tx
            .prepare_cached("SELECT 1 FROM vendors WHERE business_name = ?1 AND gross_sale_revenue IS ?2")?
            .exists(rusqlite::params![row.business_name, row.gross_sale_revenue])?;
        if exists {
            result.skipped += 1;
            continue;
        }
        tx.execute(
            "INSERT INTO vendors (business_name, gross_sale_revenue, import_id) VALUES (?1, ?2, ?3)",
            rusqlite::params![row.business_name, row.gross_sale_revenue, import_id],
        )?;
        result.imported += 1;
    }
    finish_import(&tx, import_id, rows.len())?;
    tx.commit()?;
    info!(imported = result.imported, skipped = result.skipped, "imported vendor directory");
    Ok(result)
}

pub fn import_contracts(conn: &Connection, file_path: &Path) -> Result<ImportResult> {
    let rows = parse_contracts(file_path)?;
    let tx = conn.unchecked_transaction()?;
    let Some(import_id) = begin_import(&tx, file_path, ImportKind::Contracts, None)? else {
        return Ok(ImportResult::duplicate());
    };
    let mut result = ImportResult::default();
    for row in &rows {
        let exists = tx
            .prepare_cached(
                "SELECT 1 FROM contracts WHERE vendor = ?1 AND dollars_spent IS ?2 AND status IS ?3 AND description IS ?4",
            )?
            .exists(rusqlite::params![row.vendor, row.dollars_spent, row.status, row.description])?;
        if exists {
            result.skipped += 1;
            continue;
        }
        tx.execute(
            "INSERT INTO contracts (vendor, dollars_spent, status, description, import_id) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![row.vendor, row.dollars_spent, row.status, row.description, import_id],
        )?;
        result.imported += 1;
    }
    finish_import(&tx, import_id, rows.len())?;
    tx.commit()?;
    info!(imported = result.imported, skipped = result.skipped, "imported contract results");
    Ok(result)
}

pub fn import_file(
    conn: &Connection,
    file_path: &Path,
    kind: ImportKind,
    candidate: Option<&str>,
) -> Result<ImportResult> {
    if candidate.is_some() && !kind.needs_candidate() {
        warn!(kind = kind.key(), "candidate ignored; rows are attributed from the file");
    }
    match kind {
        ImportKind::Contributions => {
            let candidate = candidate.ok_or_else(|| {
                AppError::Other(format!("{} imports need a candidate", kind.label()))
            })?;
            import_contributions(conn, file_path, candidate)
        }
        ImportKind::PayToPlay => import_p2p(conn, file_path),
        ImportKind::Vendors => import_vendors(conn, file_path),
        ImportKind::Contracts => import_contracts(conn, file_path),
    }
}
