mod api;
mod candidates;
mod charts;
mod classifier;
mod cli;
mod client;
mod db;
mod donor_search;
mod error;
mod fmt;
mod importer;
mod logging;
mod matcher;
mod models;
mod reports;
mod search;
mod settings;
mod tui;

use clap::{CommandFactory, Parser};

use cli::{CandidatesCommands, Cli, Commands, ImportCommands, ReportCommands};
use importer::ImportKind;

fn main() {
    let cli = Cli::parse();
    let settings = settings::load_settings();

    // The dashboard owns the terminal, so its logs go to a file.
    if matches!(cli.command, Commands::Dashboard { .. }) {
        if let Err(e) = logging::init_file(&settings.log_path(), &settings.log_filter) {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    } else {
        logging::init_stderr(&settings.log_filter);
    }

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Status => cli::status::run(),
        Commands::Candidates { command } => match command {
            CandidatesCommands::List => cli::candidates::list(),
            CandidatesCommands::Add {
                name,
                recipient_first,
                recipient_last,
                bio,
            } => cli::candidates::add(&name, &recipient_first, &recipient_last, bio.as_deref()),
        },
        Commands::Import { command } => match command {
            ImportCommands::Contributions { file, candidate } => {
                cli::import::run(&file, ImportKind::Contributions, Some(&candidate))
            }
            ImportCommands::P2p { file } => cli::import::run(&file, ImportKind::PayToPlay, None),
            ImportCommands::Vendors { file } => cli::import::run(&file, ImportKind::Vendors, None),
            ImportCommands::Contracts { file } => cli::import::run(&file, ImportKind::Contracts, None),
        },
        Commands::Report { command } => match command {
            ReportCommands::Breakdown(args) => cli::report::breakdown(&args),
            ReportCommands::Donors(args) => cli::report::donors(&args),
            ReportCommands::Employers(args) => cli::report::employers(&args),
            ReportCommands::Repeated(args) => cli::report::repeated(&args),
            ReportCommands::Timeline(args) => cli::report::timeline(&args),
            ReportCommands::Total(args) => cli::report::total(&args),
            ReportCommands::Vendors(args) => cli::report::vendors(&args),
            ReportCommands::Contracts(args) => cli::report::contracts(&args),
        },
        Commands::Search {
            candidate,
            query,
            remote,
        } => cli::search::run(&candidate, &query, remote),
        Commands::Export {
            candidate,
            output,
            remote,
        } => cli::export::run(&candidate, output, remote),
        Commands::Serve { bind } => cli::serve::run(bind),
        Commands::Dashboard { candidate } => cli::dashboard::run(&candidate),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "donortrail", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
