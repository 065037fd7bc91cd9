pub mod candidates;
pub mod dashboard;
pub mod export;
pub mod import;
pub mod init;
pub mod report;
pub mod search;
pub mod serve;
pub mod status;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(
    name = "donortrail",
    version,
    about = "Follow the money: campaign contributions, donor search and pay-to-play cross-references."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for donortrail data (default: ~/Documents/donortrail)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Show current database and summary statistics.
    Status,
    /// Manage the candidate registry.
    Candidates {
        #[command(subcommand)]
        command: CandidatesCommands,
    },
    /// Import an ELEC export, pay-to-play workbook, vendor list or contract list.
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },
    /// Print one dashboard section as a table.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Look up a donor in a candidate's contributions.
    Search {
        /// Candidate slug or alias, e.g. James_Solomon
        candidate: String,
        /// Donor name or fragment
        query: String,
        /// Ask the configured API instead of the local database
        #[arg(long)]
        remote: bool,
    },
    /// Write the combined contributions CSV for a candidate.
    Export {
        /// Candidate slug or alias
        candidate: String,
        /// Output path (default: <data_dir>/exports/<Candidate>_combined_contributions.csv)
        #[arg(long)]
        output: Option<String>,
        /// Download from the configured API instead of the local database
        #[arg(long)]
        remote: bool,
    },
    /// Run the JSON API.
    Serve {
        /// Address to bind (default from settings, e.g. 127.0.0.1:5000)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Full-screen dashboard for one candidate, fed by the API.
    Dashboard {
        /// Candidate slug or alias
        candidate: String,
    },
    /// Print shell completions.
    Completions {
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum CandidatesCommands {
    /// List registered candidates.
    List,
    /// Register a new candidate.
    Add {
        /// Display name, e.g. 'Mussab Ali'
        name: String,
        /// Recipient first name as it appears in pay-to-play records
        #[arg(long = "first")]
        recipient_first: String,
        /// Recipient last name as it appears in pay-to-play records
        #[arg(long = "last")]
        recipient_last: String,
        /// Short biography
        #[arg(long)]
        bio: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ImportCommands {
    /// ELEC contribution export (CSV or XLSX) for one candidate.
    Contributions {
        /// Path to the export
        file: String,
        /// Candidate slug or alias
        #[arg(long)]
        candidate: String,
    },
    /// Pay-to-play workbook; rows are attributed by recipient name.
    P2p {
        file: String,
    },
    /// Municipal vendor directory.
    Vendors {
        file: String,
    },
    /// Contract award list.
    Contracts {
        file: String,
    },
}

/// Which candidate to report on, and where the numbers come from.
#[derive(Args)]
pub struct ReportArgs {
    /// Candidate slug or alias
    pub candidate: String,
    /// Read through the configured API instead of the local database
    #[arg(long)]
    pub remote: bool,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Contribution totals by contributor group.
    Breakdown(ReportArgs),
    /// Top donors by total amount.
    Donors(ReportArgs),
    /// Top employers by total amount.
    Employers(ReportArgs),
    /// Donors who gave more than once.
    Repeated(ReportArgs),
    /// Monthly donation totals.
    Timeline(ReportArgs),
    /// Total raised.
    Total(ReportArgs),
    /// Donor businesses matching municipal vendors.
    Vendors(ReportArgs),
    /// Donor businesses matching contract awards.
    Contracts(ReportArgs),
}
