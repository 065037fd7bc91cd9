use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};
use rusqlite::Connection;

use crate::candidates::{resolve_id, Registry};
use crate::charts::{group_proportions, labelled_values, line_series, month_label};
use crate::cli::ReportArgs;
use crate::client::ApiClient;
use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::{dollars, money, number};
use crate::matcher;
use crate::models::{
    BarChartPayload, ContractMatch, ContributionGroupRecord, RepeatFrequency, RepeatedDonor,
    TopDonorRow, VendorMatch,
};
use crate::reports;
use crate::settings::load_settings;

enum Source {
    Local { conn: Connection, id: i64 },
    Remote { client: ApiClient },
}

/// A resolved candidate plus where its numbers are read from. Both sources
/// produce the same payloads, so every report prints identically.
struct Target {
    name: String,
    slug: String,
    source: Source,
}

impl Target {
    fn open(args: &ReportArgs) -> Result<Self> {
        let settings = load_settings();
        if args.remote {
            let client = ApiClient::new(&settings.api_base_url);
            let candidate = Registry::new(client.candidates()?).require(&args.candidate)?.clone();
            return Ok(Self {
                name: candidate.display_name,
                slug: candidate.slug,
                source: Source::Remote { client },
            });
        }
        let conn = get_connection(&settings.db_path())?;
        let (id, candidate) = resolve_id(&conn, &args.candidate)?;
        Ok(Self {
            name: candidate.display_name,
            slug: candidate.slug,
            source: Source::Local { conn, id },
        })
    }

    fn contributions(&self) -> Result<Vec<ContributionGroupRecord>> {
        match &self.source {
            Source::Local { conn, id } => reports::contributions_by_group(conn, *id),
            Source::Remote { client } => client.contributions(&self.slug),
        }
    }

    fn top_donors(&self) -> Result<Vec<TopDonorRow>> {
        match &self.source {
            Source::Local { conn, id } => reports::top_donors_table(conn, *id),
            Source::Remote { client } => client.top_donors_table(&self.slug),
        }
    }

    fn top_employers(&self) -> Result<BarChartPayload> {
        match &self.source {
            Source::Local { conn, id } => reports::top_employers_bar(conn, *id),
            Source::Remote { client } => client.top_employers_bar(&self.slug),
        }
    }

    fn repeated(&self) -> Result<(Vec<RepeatedDonor>, RepeatFrequency)> {
        match &self.source {
            Source::Local { conn, id } => Ok((
                reports::repeated_donors(conn, *id)?,
                reports::repeat_frequency(conn, *id)?,
            )),
            Source::Remote { client } => Ok((
                client.repeated_donors(&self.slug)?,
                client.repeat_frequency(&self.slug)?,
            )),
        }
    }

    fn timeline(&self) -> Result<BarChartPayload> {
        match &self.source {
            Source::Local { conn, id } => reports::donations_over_time(conn, *id),
            Source::Remote { client } => client.donations_over_time(&self.slug),
        }
    }

    fn total(&self) -> Result<f64> {
        let total = match &self.source {
            Source::Local { conn, id } => reports::total_donations(conn, *id, &self.slug)?,
            Source::Remote { client } => client.total_donations(&self.slug)?,
        };
        Ok(total.total_donations)
    }

    fn vendors(&self) -> Result<Vec<VendorMatch>> {
        match &self.source {
            Source::Local { conn, id } => matcher::vendor_matches(conn, *id),
            Source::Remote { client } => Ok(client.vendors(&self.slug)?.vendor_matches),
        }
    }

    fn contracts(&self) -> Result<Vec<ContractMatch>> {
        match &self.source {
            Source::Local { conn, id } => matcher::contract_matches(conn, *id),
            Source::Remote { client } => Ok(client.contracts(&self.slug)?.contract_matches),
        }
    }
}

fn amount_cell(amount: f64) -> Cell {
    Cell::new(dollars(amount)).set_alignment(CellAlignment::Right)
}

pub fn breakdown(args: &ReportArgs) -> Result<()> {
    let target = Target::open(args)?;
    let records = target.contributions()?;

    let mut table = Table::new();
    table.set_header(vec!["Contributor Group", "Amount", "Share"]);
    for entry in group_proportions(&records) {
        table.add_row(vec![
            Cell::new(entry.label),
            amount_cell(entry.value),
            Cell::new(format!("{}%", entry.percent)).set_alignment(CellAlignment::Right),
        ]);
    }
    let total: f64 = records.iter().map(|r| r.contribution_amount).sum();
    table.add_row(vec![Cell::new("Total".bold()), amount_cell(total), Cell::new("")]);

    println!("{}: Contributions by Group\n{table}", target.name);
    Ok(())
}

pub fn donors(args: &ReportArgs) -> Result<()> {
    let target = Target::open(args)?;

    let mut table = Table::new();
    table.set_header(vec!["Donor", "Amount", "Employer", "City"]);
    for row in target.top_donors()? {
        table.add_row(vec![
            Cell::new(row.contributor_name),
            amount_cell(row.contribution_amount),
            Cell::new(row.employer.unwrap_or_default()),
            Cell::new(row.donor_city.unwrap_or_default()),
        ]);
    }
    println!("{}: Top Donors\n{table}", target.name);
    Ok(())
}

pub fn employers(args: &ReportArgs) -> Result<()> {
    let target = Target::open(args)?;
    let rows = labelled_values(&target.top_employers()?);

    let mut table = Table::new();
    table.set_header(vec!["Employer", "Amount"]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), amount_cell(value)]);
    }
    println!("{}: Top Employers\n{table}", target.name);
    Ok(())
}

pub fn repeated(args: &ReportArgs) -> Result<()> {
    let target = Target::open(args)?;
    let (donors, frequency) = target.repeated()?;

    let mut table = Table::new();
    table.set_header(vec!["Donor", "Total", "Gifts", "Months"]);
    for donor in donors {
        // Frequency only covers the most active donors; others leave these blank.
        let months = frequency.get(&donor.contributor_name);
        let gifts: i64 = months.map(|m| m.values().sum()).unwrap_or(0);
        let active = months
            .map(|m| m.keys().map(|k| month_label(k)).collect::<Vec<_>>().join(", "))
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(donor.contributor_name),
            amount_cell(donor.total_amount),
            Cell::new(if gifts > 0 { number(gifts) } else { String::new() }),
            Cell::new(active),
        ]);
    }
    println!("{}: Repeat Donors\n{table}", target.name);
    Ok(())
}

pub fn timeline(args: &ReportArgs) -> Result<()> {
    let target = Target::open(args)?;
    let series = line_series(&target.timeline()?);

    let mut table = Table::new();
    table.set_header(vec!["Month", "Donations"]);
    for (month, (_, total)) in series.labels.iter().zip(&series.points) {
        table.add_row(vec![Cell::new(month_label(month)), amount_cell(*total)]);
    }
    println!("{}: Donations Over Time\n{table}", target.name);
    Ok(())
}

pub fn total(args: &ReportArgs) -> Result<()> {
    let target = Target::open(args)?;
    let total = target.total()?;
    println!("{}: {}", target.name, money(total).green().bold());
    Ok(())
}

pub fn vendors(args: &ReportArgs) -> Result<()> {
    let target = Target::open(args)?;
    let matches = target.vendors()?;

    if matches.is_empty() {
        println!("{}: no donor businesses match the vendor directory.", target.name);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Donor Business", "Donated", "Matched Vendor", "Similarity", "Gross Sales"]);
    for m in matches {
        table.add_row(vec![
            Cell::new(m.business_name),
            amount_cell(m.contribution_amount),
            Cell::new(m.matched_vendor),
            Cell::new(format!("{:.0}", m.similarity)).set_alignment(CellAlignment::Right),
            Cell::new(m.gross_sale_revenue.unwrap_or_default()),
        ]);
    }
    println!("{}: {}\n{table}", target.name, "Vendor Matches".yellow().bold());
    Ok(())
}

pub fn contracts(args: &ReportArgs) -> Result<()> {
    let target = Target::open(args)?;
    let matches = target.contracts()?;

    if matches.is_empty() {
        println!("{}: no donor businesses match awarded contracts.", target.name);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Donor Business", "Donated", "Matched Vendor", "Contract Value", "Status", "Similarity"]);
    for m in matches {
        table.add_row(vec![
            Cell::new(m.donor_business),
            amount_cell(m.donated),
            Cell::new(m.matched_vendor),
            Cell::new(m.contract_value.unwrap_or_default()),
            Cell::new(m.status.unwrap_or_default()),
            Cell::new(format!("{:.0}", m.similarity)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{}: {}\n{table}", target.name, "Contract Matches".yellow().bold());
    Ok(())
}
